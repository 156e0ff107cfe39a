use logtrail_canonical::{hash_leaf, LeafHash};

/// An entry paired with the leaf hash the Log Service stores for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Raw entry bytes.
    pub entry: Vec<u8>,
    /// `SHA-256(0x00 || entry)`.
    pub leaf_hash: LeafHash,
}

/// Forms the leaf for `entry`.
///
/// The hash matches the one the Log Service computes, so lookups by hash
/// find the submitted leaf.
pub fn form_leaf(entry: impl Into<Vec<u8>>) -> Leaf {
    let entry = entry.into();
    let leaf_hash = hash_leaf(&entry);
    Leaf { entry, leaf_hash }
}
