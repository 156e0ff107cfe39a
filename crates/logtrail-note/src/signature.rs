//! Signature lines of a signed note.

/// One signature line: `U+2014 <name> <base64(key_hash || sig)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Signer name (e.g. `example.com/log`).
    pub name: String,
    /// First four bytes of the signer's key hash, big-endian.
    pub key_hash: u32,
    /// Standard base64 of `key_hash || signature bytes`, as written in the note.
    pub base64: String,
}
