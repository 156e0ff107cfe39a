use thiserror::Error;

/// Failure reported by a [`Signer`](crate::Signer) implementation.
#[derive(Debug, Error)]
#[error("signer {name} failed: {reason}")]
pub struct SignerError {
    /// Name of the signer that failed.
    pub name: String,
    /// Human-readable cause.
    pub reason: String,
}

/// Errors that can occur while signing, opening, or decoding notes and keys.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Note text or signature block violates the note format.
    #[error("malformed note: {0}")]
    Malformed(&'static str),
    /// Signer or verifier name is empty or contains whitespace or `+`.
    #[error("invalid key name '{0}'")]
    InvalidName(String),
    /// Encoded signer or verifier key could not be parsed.
    #[error("malformed key: {0}")]
    MalformedKey(&'static str),
    /// Key hash embedded in an encoded key does not match its contents.
    #[error("key hash mismatch for {name}: encoded {encoded:08x}, computed {computed:08x}")]
    KeyHashMismatch {
        /// Key name.
        name: String,
        /// Hash written in the encoding.
        encoded: u32,
        /// Hash computed from name and key bytes.
        computed: u32,
    },
    /// Key uses an algorithm other than ed25519.
    #[error("unsupported key algorithm {0}")]
    UnsupportedAlgorithm(u8),
    /// A signature from a known verifier did not verify.
    #[error("invalid signature by {name}+{key_hash:08x}")]
    InvalidSignature {
        /// Verifier name.
        name: String,
        /// Verifier key hash.
        key_hash: u32,
    },
    /// No signature on the note came from a known verifier.
    #[error("note has no signatures from known verifiers")]
    Unverified,
    /// The signer failed to produce a signature.
    #[error(transparent)]
    Signer(#[from] SignerError),
}
