//! Reference RFC 6962 Merkle tree algorithms.
//!
//! Proof generation follows the recursive definitions of RFC 6962 §2.1 over a
//! slice of leaf hashes. Verification uses the inner/border decomposition of
//! the audit path, so the expected proof length is checked before any
//! hashing.

use crate::digest::{empty_root, hash_children, LeafHash, HASH_SIZE};
use crate::errors::ProofError;
use crate::proof::{ConsistencyProof, InclusionProof};

/// Largest power of two strictly less than `n` (`n >= 2`).
fn split_point(n: usize) -> usize {
    debug_assert!(n >= 2);
    1 << (usize::BITS - 1 - (n - 1).leading_zeros())
}

/// Merkle tree hash over `leaves`.
pub fn root(leaves: &[LeafHash]) -> [u8; HASH_SIZE] {
    match leaves.len() {
        0 => empty_root(),
        1 => *leaves[0].as_bytes(),
        n => {
            let k = split_point(n);
            hash_children(&root(&leaves[..k]), &root(&leaves[k..]))
        }
    }
}

fn path(index: usize, leaves: &[LeafHash], out: &mut Vec<Vec<u8>>) {
    let n = leaves.len();
    if n <= 1 {
        return;
    }
    let k = split_point(n);
    if index < k {
        path(index, &leaves[..k], out);
        out.push(root(&leaves[k..]).to_vec());
    } else {
        path(index - k, &leaves[k..], out);
        out.push(root(&leaves[..k]).to_vec());
    }
}

/// Builds the inclusion proof for `leaves[index]` in the tree of all `leaves`.
pub fn inclusion_proof(index: u64, leaves: &[LeafHash]) -> Result<InclusionProof, ProofError> {
    let size = leaves.len() as u64;
    if index >= size {
        return Err(ProofError::IndexOutOfRange { index, size });
    }
    let mut hashes = Vec::new();
    path(index as usize, leaves, &mut hashes);
    Ok(InclusionProof {
        leaf_index: index,
        tree_size: size,
        hashes,
    })
}

fn subproof(m: usize, leaves: &[LeafHash], complete: bool, out: &mut Vec<Vec<u8>>) {
    let n = leaves.len();
    if m == n {
        if !complete {
            out.push(root(leaves).to_vec());
        }
        return;
    }
    let k = split_point(n);
    if m <= k {
        subproof(m, &leaves[..k], complete, out);
        out.push(root(&leaves[k..]).to_vec());
    } else {
        subproof(m - k, &leaves[k..], false, out);
        out.push(root(&leaves[..k]).to_vec());
    }
}

/// Builds the consistency proof between the first `from` leaves and the first `to` leaves.
///
/// Proofs from the empty tree and between equal sizes are empty.
pub fn consistency_proof(
    from: u64,
    to: u64,
    leaves: &[LeafHash],
) -> Result<ConsistencyProof, ProofError> {
    let size = leaves.len() as u64;
    if from > to || to > size {
        return Err(ProofError::InvalidRange { from, to, size });
    }
    let mut hashes = Vec::new();
    if from > 0 && from < to {
        subproof(from as usize, &leaves[..to as usize], true, &mut hashes);
    }
    Ok(ConsistencyProof {
        from_size: from,
        to_size: to,
        hashes,
    })
}

/// Splits an audit path for `index` in a tree of `size` into its inner and border parts.
fn decompose(index: u64, size: u64) -> (usize, usize) {
    let inner = (u64::BITS - (index ^ (size - 1)).leading_zeros()) as usize;
    let border = index.checked_shr(inner as u32).unwrap_or(0).count_ones() as usize;
    (inner, border)
}

/// Expected number of hashes in an inclusion proof.
pub fn inclusion_proof_len(index: u64, size: u64) -> Result<usize, ProofError> {
    if index >= size {
        return Err(ProofError::IndexOutOfRange { index, size });
    }
    let (inner, border) = decompose(index, size);
    Ok(inner + border)
}

fn chain_inner(mut seed: Vec<u8>, proof: &[Vec<u8>], index: u64) -> Vec<u8> {
    for (i, h) in proof.iter().enumerate() {
        seed = if (index >> i) & 1 == 0 {
            hash_children(&seed, h).to_vec()
        } else {
            hash_children(h, &seed).to_vec()
        };
    }
    seed
}

fn chain_inner_right(mut seed: Vec<u8>, proof: &[Vec<u8>], index: u64) -> Vec<u8> {
    for (i, h) in proof.iter().enumerate() {
        if (index >> i) & 1 == 1 {
            seed = hash_children(h, &seed).to_vec();
        }
    }
    seed
}

fn chain_border_right(mut seed: Vec<u8>, proof: &[Vec<u8>]) -> Vec<u8> {
    for h in proof {
        seed = hash_children(h, &seed).to_vec();
    }
    seed
}

/// Checks that `proof` places `leaf` at `proof.leaf_index` under `root`.
pub fn verify_inclusion(
    leaf: &LeafHash,
    proof: &InclusionProof,
    root: &[u8],
) -> Result<(), ProofError> {
    let expected = inclusion_proof_len(proof.leaf_index, proof.tree_size)?;
    if proof.hashes.len() != expected {
        return Err(ProofError::WrongLength {
            expected,
            actual: proof.hashes.len(),
        });
    }
    let (inner, _) = decompose(proof.leaf_index, proof.tree_size);
    let computed = chain_inner(leaf.to_vec(), &proof.hashes[..inner], proof.leaf_index);
    let computed = chain_border_right(computed, &proof.hashes[inner..]);
    if computed != root {
        return Err(ProofError::RootMismatch);
    }
    Ok(())
}

/// Checks that the tree with `new_root` is an append-only extension of the tree with `old_root`.
pub fn verify_consistency(
    proof: &ConsistencyProof,
    old_root: &[u8],
    new_root: &[u8],
) -> Result<(), ProofError> {
    let (from, to) = (proof.from_size, proof.to_size);
    let hashes = &proof.hashes;

    if from > to {
        return Err(ProofError::InvalidRange { from, to, size: to });
    }
    if from == to || from == 0 {
        if !hashes.is_empty() {
            return Err(ProofError::WrongLength {
                expected: 0,
                actual: hashes.len(),
            });
        }
        if from == to && old_root != new_root {
            return Err(ProofError::RootMismatch);
        }
        return Ok(());
    }

    let (inner, border) = decompose(from - 1, to);
    let shift = from.trailing_zeros() as usize;
    let inner = inner - shift;
    let (seed, start) = if from == 1 << shift {
        (old_root.to_vec(), 0)
    } else {
        match hashes.first() {
            Some(first) => (first.clone(), 1),
            None => {
                return Err(ProofError::WrongLength {
                    expected: 1 + inner + border,
                    actual: 0,
                })
            }
        }
    };
    let expected = start + inner + border;
    if hashes.len() != expected {
        return Err(ProofError::WrongLength {
            expected,
            actual: hashes.len(),
        });
    }

    let path = &hashes[start..];
    let mask = (from - 1) >> shift;

    let old = chain_inner_right(seed.clone(), &path[..inner], mask);
    let old = chain_border_right(old, &path[inner..]);
    if old != old_root {
        return Err(ProofError::RootMismatch);
    }

    let new = chain_inner(seed, &path[..inner], mask);
    let new = chain_border_right(new, &path[inner..]);
    if new != new_root {
        return Err(ProofError::RootMismatch);
    }
    Ok(())
}
