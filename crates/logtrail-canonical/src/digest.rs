//! Leaf hashing with RFC 6962 domain separation.
//!
//! Leaves are hashed as `sha256(0x00 || entry)` and interior nodes as
//! `sha256(0x01 || left || right)`. The Log Service hashes leaves the same
//! way; a mismatch here makes every inclusion-by-hash lookup fail with a
//! leaf-not-found error.

use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;

/// Size in bytes of every hash produced by this module.
pub const HASH_SIZE: usize = 32;

/// Domain separator prefixed to leaf data.
const LEAF_PREFIX: u8 = 0x00;

/// Domain separator prefixed to interior node data.
const NODE_PREFIX: u8 = 0x01;

/// SHA-256 hash identifying one leaf of the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafHash(#[serde(with = "crate::b64::fixed")] [u8; HASH_SIZE]);

impl LeafHash {
    /// Wraps raw hash bytes.
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Returns the hash bytes as an owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl AsRef<[u8]> for LeafHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for LeafHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafHash({})", self)
    }
}

impl fmt::Display for LeafHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Computes the RFC 6962 leaf hash of an entry.
///
/// # Example
///
/// ```rust
/// use logtrail_canonical::hash_leaf;
///
/// let a = hash_leaf(b"hello");
/// let b = hash_leaf(b"hello");
/// assert_eq!(a, b);
/// assert_ne!(a, hash_leaf(b"world"));
/// ```
pub fn hash_leaf(entry: &[u8]) -> LeafHash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(entry);
    LeafHash(hasher.finalize().into())
}

/// Computes the RFC 6962 interior node hash of two children.
pub fn hash_children(left: &[u8], right: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Hash of the empty tree: `sha256("")`.
pub fn empty_root() -> [u8; HASH_SIZE] {
    Sha256::digest([]).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_hash_is_domain_separated() {
        let leaf = hash_leaf(b"abc");
        let raw: [u8; HASH_SIZE] = Sha256::digest(b"abc").into();
        assert_ne!(leaf.as_bytes(), &raw);
    }

    #[test]
    fn leaf_and_node_prefixes_differ() {
        let left = [0u8; HASH_SIZE];
        let right = [1u8; HASH_SIZE];
        let mut concat = left.to_vec();
        concat.extend_from_slice(&right);
        assert_ne!(hash_leaf(&concat).as_bytes(), &hash_children(&left, &right));
    }

    #[test]
    fn display_is_lowercase_hex() {
        let leaf = LeafHash::from_bytes([0xab; HASH_SIZE]);
        assert_eq!(leaf.to_string(), "ab".repeat(HASH_SIZE));
    }
}
