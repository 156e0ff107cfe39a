//! Checkpoint and proof personality in front of a Merkle transparency log.
//!
//! A [`Personality`] sits between clients and a [`LogService`] that owns the
//! Merkle tree. It offers four operations:
//! - [`Personality::signed_checkpoint`]: fetch and sign the current checkpoint
//! - [`Personality::append`]: submit an entry and wait until the log
//!   includes it, returning a signed checkpoint
//! - [`Personality::prove_inclusion`]: prove an entry is in a tree size
//! - [`Personality::update_checkpoint`]: bring a stale checkpoint forward
//!   with a consistency proof
//!
//! Every operation takes a [`RequestContext`] carrying the caller's
//! cancellation token and deadline. The personality keeps no per-request
//! state and is safe to share across tasks.
//!
//! ```rust
//! use std::sync::Arc;
//! use logtrail_note::NoteSigner;
//! use logtrail_personality::memory::{Integration, MemoryLog};
//! use logtrail_personality::{Personality, PersonalityConfig, RequestContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new(MemoryLog::new(1, Integration::Immediate));
//! let signer = NoteSigner::new("example.com/log", &[1u8; 32])?;
//! let verifier = signer.verifier();
//! let personality = Personality::new(PersonalityConfig::for_tree(1), log, Arc::new(signer))?;
//!
//! let ctx = RequestContext::new();
//! let signed = personality.append(&ctx, "hello").await?;
//! let (checkpoint, _note) = signed.open(&[&verifier])?;
//! assert_eq!(checkpoint.size, 1);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

/// Append-and-observe.
pub mod appender;
/// Observation loop pacing.
pub mod backoff;
/// Personality configuration.
pub mod config;
/// Request cancellation and deadlines.
pub mod context;
/// Error types for the personality and its Log Service.
pub mod errors;
/// Checkpoint fetching.
pub mod fetcher;
/// Leaf formation.
pub mod leaf;
/// The Log Service capability.
pub mod log_service;
/// In-memory Log Service.
pub mod memory;
/// The personality itself.
pub mod personality;
/// Inclusion and consistency proofs.
pub mod proofs;
/// Signed checkpoint bytes.
pub mod signed;

pub use appender::AppendReceipt;
pub use config::{BackoffConfig, PersonalityConfig, DEFAULT_ORIGIN};
pub use context::RequestContext;
pub use errors::{ConfigError, ErrorKind, LogServiceError, OpenError, PersonalityError};
pub use leaf::{form_leaf, Leaf};
pub use log_service::{Connector, LogService, SubmitOutcome};
pub use personality::Personality;
pub use signed::SignedCheckpoint;
