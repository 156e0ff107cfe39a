//! Proof types returned to callers.
//!
//! The personality does not interpret proof hashes; it passes them through
//! from the Log Service. Verification helpers live in [`crate::merkle`].

use serde::{Deserialize, Serialize};

/// Audit path proving a leaf is present in a tree of `tree_size` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Zero-based position of the leaf.
    pub leaf_index: u64,
    /// Size of the tree the path was computed against.
    pub tree_size: u64,
    /// Sibling hashes from the leaf up to the root.
    #[serde(with = "crate::b64::list")]
    pub hashes: Vec<Vec<u8>>,
}

/// Audit path proving a tree of `to_size` leaves extends one of `from_size` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Size of the older tree.
    pub from_size: u64,
    /// Size of the newer tree.
    pub to_size: u64,
    /// Consistency path hashes.
    #[serde(with = "crate::b64::list")]
    pub hashes: Vec<Vec<u8>>,
}
