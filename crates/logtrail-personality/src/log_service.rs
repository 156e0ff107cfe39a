//! The Log Service capability consumed by the personality.
//!
//! The Log Service owns the Merkle tree. The personality only submits leaves,
//! reads the latest tree state, and asks for proofs.

use async_trait::async_trait;
use std::sync::Arc;

use logtrail_canonical::{ConsistencyProof, InclusionProof, LeafHash};

use crate::context::RequestContext;
use crate::errors::LogServiceError;
use crate::leaf::Leaf;

/// Acknowledgement of a leaf submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The leaf was accepted and will be integrated.
    Queued,
    /// A leaf with the same hash was already submitted.
    Duplicate,
}

/// Remote Merkle log holding the authoritative tree.
///
/// Implementations are shared across concurrent requests and must honour the
/// context they are handed where they can; the personality also races every
/// call against the same context.
#[async_trait]
pub trait LogService: Send + Sync {
    /// Queues `leaf` for integration into tree `tree_id`.
    ///
    /// Submission is idempotent on the leaf hash.
    async fn submit_leaf(
        &self,
        ctx: &RequestContext,
        tree_id: i64,
        leaf: &Leaf,
    ) -> Result<SubmitOutcome, LogServiceError>;

    /// Returns the LogRootV1 encoding of the current tree state.
    async fn get_latest_root(
        &self,
        ctx: &RequestContext,
        tree_id: i64,
    ) -> Result<Vec<u8>, LogServiceError>;

    /// Returns one proof per position at which `leaf_hash` occurs in the
    /// tree of size `tree_size`.
    async fn get_inclusion_proof_by_hash(
        &self,
        ctx: &RequestContext,
        tree_id: i64,
        leaf_hash: &LeafHash,
        tree_size: u64,
    ) -> Result<Vec<InclusionProof>, LogServiceError>;

    /// Returns a proof that the tree of size `to_size` extends the tree of
    /// size `from_size`.
    async fn get_consistency_proof(
        &self,
        ctx: &RequestContext,
        tree_id: i64,
        from_size: u64,
        to_size: u64,
    ) -> Result<ConsistencyProof, LogServiceError>;
}

/// Establishes a Log Service connection for an address.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to the Log Service at `addr`.
    async fn connect(&self, addr: &str) -> Result<Arc<dyn LogService>, LogServiceError>;
}
