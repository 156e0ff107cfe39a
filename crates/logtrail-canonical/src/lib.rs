//! Canonical data primitives for Logtrail checkpoints and proofs.
//!
//! Everything that participates in hashing, signing, or proof lookup lives in
//! this crate:
//! - RFC 6962 leaf and interior node hashing ([`hash_leaf`], [`hash_children`])
//! - The Log Service's serialized tree state ([`TreeState`], LogRootV1)
//! - Checkpoint text with a stable serialization ([`Checkpoint`])
//! - Inclusion and consistency proof types passed through to callers
//! - A reference Merkle implementation used to build and check proofs
//!
//! Core invariants:
//! - Leaf hashes are domain-separated: `SHA-256(0x00 || entry)`
//! - Equal `(origin, root_hash, size)` checkpoints marshal to identical bytes
//! - Decoding never defaults a malformed field; it fails
//!
#![deny(missing_docs)]

/// Serde helpers for base64-encoded hash bytes.
pub mod b64;
/// Checkpoint text and its canonical serialization.
pub mod checkpoint;
/// Domain-separated leaf and node hashing.
pub mod digest;
/// Error types for canonical primitives.
pub mod errors;
/// Decoding of the Log Service's LogRootV1 tree state.
pub mod log_root;
/// Reference RFC 6962 Merkle tree algorithms.
pub mod merkle;
/// Inclusion and consistency proof types.
pub mod proof;

pub use checkpoint::Checkpoint;
pub use digest::{hash_children, hash_leaf, LeafHash, HASH_SIZE};
pub use errors::{CheckpointError, LogRootError, ProofError};
pub use log_root::TreeState;
pub use proof::{ConsistencyProof, InclusionProof};
