//! Signed notes for Logtrail checkpoints.
//!
//! This crate provides:
//! - The [`Signer`] and [`Verifier`] capabilities the personality signs through
//! - Ed25519 implementations with the standard key encodings ([`NoteSigner`], [`NoteVerifier`])
//! - [`sign_note`] and [`open_note`] for the signed-note wire format
//!
//! A signed note carries one signature line per signer, so a checkpoint can be
//! countersigned by several identities.

#![deny(missing_docs)]

/// Error types for note operations.
pub mod errors;
/// Ed25519 keys and their text encodings.
pub mod keys;
/// Note signing and opening.
pub mod note;
/// Signature line type.
pub mod signature;

pub use errors::{NoteError, SignerError};
pub use keys::{generate_key, key_hash, NoteSigner, NoteVerifier};
pub use note::{open_note, sign_note, Note};
pub use signature::Signature;

/// Produces signatures over note text.
///
/// Implementations must be safe to share across concurrent requests.
pub trait Signer: Send + Sync {
    /// Signer name, written on the signature line.
    fn name(&self) -> &str;
    /// Key hash identifying the signing key.
    fn key_hash(&self) -> u32;
    /// Signs `msg`, returning raw signature bytes.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Checks signatures produced by one [`Signer`].
pub trait Verifier: Send + Sync {
    /// Signer name this verifier accepts.
    fn name(&self) -> &str;
    /// Key hash this verifier accepts.
    fn key_hash(&self) -> u32;
    /// Returns whether `sig` is a valid signature over `msg`.
    fn verify(&self, msg: &[u8], sig: &[u8]) -> bool;
}
