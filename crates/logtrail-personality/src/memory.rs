//! In-memory Log Service.
//!
//! [`MemoryLog`] keeps a full RFC 6962 tree in process and lets callers script
//! its behaviour: when submitted leaves become visible, one-shot failures,
//! undecodable roots, and a tree that appears to shrink. It backs the crate's
//! tests and is usable by downstream tests the same way.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use logtrail_canonical::merkle;
use logtrail_canonical::{ConsistencyProof, InclusionProof, LeafHash, TreeState};

use crate::context::RequestContext;
use crate::errors::LogServiceError;
use crate::leaf::{form_leaf, Leaf};
use crate::log_service::{LogService, SubmitOutcome};

/// When submitted leaves are integrated into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    /// Each leaf is integrated as part of its submission.
    Immediate,
    /// Leaves stay pending until [`MemoryLog::integrate`] is called.
    Manual,
}

#[derive(Debug)]
struct State {
    leaves: Vec<LeafHash>,
    pending: Vec<LeafHash>,
    submitted: HashSet<LeafHash>,
    integration: Integration,
    revision: u64,
    reported_size: Option<u64>,
    raw_root: Option<Vec<u8>>,
    fail_root: Option<LogServiceError>,
    fail_submit: Option<LogServiceError>,
    fail_inclusion: Option<LogServiceError>,
    root_reads: usize,
    consistency_requests: Vec<(u64, u64)>,
}

impl State {
    /// Leaves visible to readers.
    fn visible(&self) -> &[LeafHash] {
        match self.reported_size {
            Some(n) if (n as usize) < self.leaves.len() => &self.leaves[..n as usize],
            _ => &self.leaves,
        }
    }

    fn push(&mut self, leaf_hash: LeafHash) {
        self.leaves.push(leaf_hash);
        self.revision += 1;
    }
}

/// A Log Service holding a single tree in memory.
#[derive(Debug)]
pub struct MemoryLog {
    tree_id: i64,
    state: Mutex<State>,
}

impl MemoryLog {
    /// Creates an empty log serving `tree_id`.
    pub fn new(tree_id: i64, integration: Integration) -> Self {
        Self {
            tree_id,
            state: Mutex::new(State {
                leaves: Vec::new(),
                pending: Vec::new(),
                submitted: HashSet::new(),
                integration,
                revision: 0,
                reported_size: None,
                raw_root: None,
                fail_root: None,
                fail_submit: None,
                fail_inclusion: None,
                root_reads: 0,
                consistency_requests: Vec::new(),
            }),
        }
    }

    /// Creates a log already holding the entries `"entry-0"` through
    /// `"entry-{n-1}"`.
    pub fn with_entries(tree_id: i64, integration: Integration, n: usize) -> Self {
        let log = Self::new(tree_id, integration);
        for i in 0..n {
            log.insert_integrated(format!("entry-{}", i));
        }
        log
    }

    /// Appends `entry` to the tree directly, bypassing submission.
    ///
    /// Duplicate entries are allowed here, which lets tests build trees where
    /// one leaf hash occurs at several positions.
    pub fn insert_integrated(&self, entry: impl Into<Vec<u8>>) -> Leaf {
        let leaf = form_leaf(entry);
        let mut state = self.state.lock();
        state.submitted.insert(leaf.leaf_hash);
        state.push(leaf.leaf_hash);
        leaf
    }

    /// Integrates every pending leaf, returning how many were added.
    pub fn integrate(&self) -> usize {
        let mut state = self.state.lock();
        let pending = std::mem::take(&mut state.pending);
        let count = pending.len();
        for leaf_hash in pending {
            state.push(leaf_hash);
        }
        count
    }

    /// Changes when submitted leaves are integrated.
    pub fn set_integration(&self, integration: Integration) {
        self.state.lock().integration = integration;
    }

    /// Number of leaves in the tree, ignoring any reported-size override.
    pub fn size(&self) -> u64 {
        self.state.lock().leaves.len() as u64
    }

    /// Number of submitted leaves awaiting integration.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Current root hash of the visible tree.
    pub fn root_hash(&self) -> Vec<u8> {
        merkle::root(self.state.lock().visible()).to_vec()
    }

    /// Leaf hashes of the visible tree, in order.
    pub fn leaf_hashes(&self) -> Vec<LeafHash> {
        self.state.lock().visible().to_vec()
    }

    /// Makes readers see only the first `size` leaves, or the whole tree when `None`.
    pub fn report_size(&self, size: Option<u64>) {
        self.state.lock().reported_size = size;
    }

    /// Serves `bytes` verbatim from `get_latest_root` until cleared with `None`.
    pub fn serve_raw_root(&self, bytes: Option<Vec<u8>>) {
        self.state.lock().raw_root = bytes;
    }

    /// Fails the next `get_latest_root` call with `err`.
    pub fn fail_next_root(&self, err: LogServiceError) {
        self.state.lock().fail_root = Some(err);
    }

    /// Fails the next `submit_leaf` call with `err`.
    pub fn fail_next_submit(&self, err: LogServiceError) {
        self.state.lock().fail_submit = Some(err);
    }

    /// Fails the next `get_inclusion_proof_by_hash` call with `err`.
    pub fn fail_next_inclusion(&self, err: LogServiceError) {
        self.state.lock().fail_inclusion = Some(err);
    }

    /// Number of `get_latest_root` calls served so far.
    pub fn root_reads(&self) -> usize {
        self.state.lock().root_reads
    }

    /// Ranges passed to `get_consistency_proof`, in call order.
    pub fn consistency_requests(&self) -> Vec<(u64, u64)> {
        self.state.lock().consistency_requests.clone()
    }

    fn check_tree(&self, tree_id: i64) -> Result<(), LogServiceError> {
        if tree_id != self.tree_id {
            return Err(LogServiceError::UnknownTree(tree_id));
        }
        Ok(())
    }
}

#[async_trait]
impl LogService for MemoryLog {
    async fn submit_leaf(
        &self,
        _ctx: &RequestContext,
        tree_id: i64,
        leaf: &Leaf,
    ) -> Result<SubmitOutcome, LogServiceError> {
        self.check_tree(tree_id)?;
        let mut state = self.state.lock();
        if let Some(err) = state.fail_submit.take() {
            return Err(err);
        }
        if !state.submitted.insert(leaf.leaf_hash) {
            return Ok(SubmitOutcome::Duplicate);
        }
        match state.integration {
            Integration::Immediate => state.push(leaf.leaf_hash),
            Integration::Manual => state.pending.push(leaf.leaf_hash),
        }
        Ok(SubmitOutcome::Queued)
    }

    async fn get_latest_root(
        &self,
        _ctx: &RequestContext,
        tree_id: i64,
    ) -> Result<Vec<u8>, LogServiceError> {
        self.check_tree(tree_id)?;
        let mut state = self.state.lock();
        state.root_reads += 1;
        if let Some(err) = state.fail_root.take() {
            return Err(err);
        }
        if let Some(raw) = &state.raw_root {
            return Ok(raw.clone());
        }
        let visible = state.visible();
        let tree = TreeState {
            size: visible.len() as u64,
            root_hash: merkle::root(visible).to_vec(),
            timestamp_nanos: 1_700_000_000_000_000_000 + state.revision,
            revision: state.revision,
            metadata: Vec::new(),
        };
        tree.encode()
            .map_err(|e| LogServiceError::Internal(e.to_string()))
    }

    async fn get_inclusion_proof_by_hash(
        &self,
        _ctx: &RequestContext,
        tree_id: i64,
        leaf_hash: &LeafHash,
        tree_size: u64,
    ) -> Result<Vec<InclusionProof>, LogServiceError> {
        self.check_tree(tree_id)?;
        let mut state = self.state.lock();
        if let Some(err) = state.fail_inclusion.take() {
            return Err(err);
        }
        let visible = state.visible();
        let current = visible.len() as u64;
        if tree_size == 0 {
            return Err(LogServiceError::InvalidArgument(
                "tree_size must be positive".to_string(),
            ));
        }
        if tree_size > current {
            return Err(LogServiceError::OutOfRange {
                requested: tree_size,
                tree_size: current,
            });
        }
        let tree = &visible[..tree_size as usize];
        // Positions are reported latest first.
        let mut proofs = Vec::new();
        for (index, _) in tree.iter().enumerate().rev().filter(|(_, h)| *h == leaf_hash) {
            let proof = merkle::inclusion_proof(index as u64, tree)
                .map_err(|e| LogServiceError::Internal(e.to_string()))?;
            proofs.push(proof);
        }
        if proofs.is_empty() {
            return Err(LogServiceError::LeafNotFound {
                leaf_hash: *leaf_hash,
                tree_size,
            });
        }
        Ok(proofs)
    }

    async fn get_consistency_proof(
        &self,
        _ctx: &RequestContext,
        tree_id: i64,
        from_size: u64,
        to_size: u64,
    ) -> Result<ConsistencyProof, LogServiceError> {
        self.check_tree(tree_id)?;
        let mut state = self.state.lock();
        state.consistency_requests.push((from_size, to_size));
        if from_size > to_size {
            return Err(LogServiceError::InvalidArgument(format!(
                "from_size {} exceeds to_size {}",
                from_size, to_size
            )));
        }
        let visible = state.visible();
        let current = visible.len() as u64;
        if to_size > current {
            return Err(LogServiceError::OutOfRange {
                requested: to_size,
                tree_size: current,
            });
        }
        merkle::consistency_proof(from_size, to_size, visible)
            .map_err(|e| LogServiceError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new()
    }

    #[tokio::test]
    async fn duplicate_submission_is_acknowledged_once() {
        let log = MemoryLog::new(1, Integration::Immediate);
        let leaf = form_leaf("a");
        assert_eq!(
            log.submit_leaf(&ctx(), 1, &leaf).await.unwrap(),
            SubmitOutcome::Queued
        );
        assert_eq!(
            log.submit_leaf(&ctx(), 1, &leaf).await.unwrap(),
            SubmitOutcome::Duplicate
        );
        assert_eq!(log.size(), 1);
    }

    #[tokio::test]
    async fn manual_integration_holds_leaves() {
        let log = MemoryLog::new(1, Integration::Manual);
        log.submit_leaf(&ctx(), 1, &form_leaf("a")).await.unwrap();
        assert_eq!((log.size(), log.pending()), (0, 1));
        assert_eq!(log.integrate(), 1);
        assert_eq!((log.size(), log.pending()), (1, 0));
    }

    #[tokio::test]
    async fn root_decodes_to_the_tree() {
        let log = MemoryLog::with_entries(1, Integration::Immediate, 3);
        let raw = log.get_latest_root(&ctx(), 1).await.unwrap();
        let state = TreeState::decode(&raw).unwrap();
        assert_eq!(state.size, 3);
        assert_eq!(state.root_hash, log.root_hash());
    }

    #[tokio::test]
    async fn other_trees_are_unknown() {
        let log = MemoryLog::new(1, Integration::Immediate);
        let err = log.get_latest_root(&ctx(), 2).await.unwrap_err();
        assert_eq!(err, LogServiceError::UnknownTree(2));
    }

    #[tokio::test]
    async fn failures_fire_once() {
        let log = MemoryLog::new(1, Integration::Immediate);
        log.fail_next_root(LogServiceError::Unavailable("down".into()));
        assert!(log.get_latest_root(&ctx(), 1).await.is_err());
        assert!(log.get_latest_root(&ctx(), 1).await.is_ok());
        assert_eq!(log.root_reads(), 2);
    }

    #[tokio::test]
    async fn inclusion_lookup_checks_size() {
        let log = MemoryLog::with_entries(1, Integration::Immediate, 4);
        let hash = form_leaf("entry-3").leaf_hash;
        let err = log
            .get_inclusion_proof_by_hash(&ctx(), 1, &hash, 5)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LogServiceError::OutOfRange {
                requested: 5,
                tree_size: 4
            }
        );
        let err = log
            .get_inclusion_proof_by_hash(&ctx(), 1, &hash, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, LogServiceError::LeafNotFound { tree_size: 3, .. }));
    }

    #[tokio::test]
    async fn repeated_leaves_yield_one_proof_per_position() {
        let log = MemoryLog::new(1, Integration::Immediate);
        log.insert_integrated("x");
        log.insert_integrated("y");
        log.insert_integrated("x");
        let proofs = log
            .get_inclusion_proof_by_hash(&ctx(), 1, &form_leaf("x").leaf_hash, 3)
            .await
            .unwrap();
        let indices: Vec<u64> = proofs.iter().map(|p| p.leaf_index).collect();
        assert_eq!(indices, vec![2, 0]);
    }

    #[tokio::test]
    async fn reported_size_hides_later_leaves() {
        let log = MemoryLog::with_entries(1, Integration::Immediate, 5);
        log.report_size(Some(2));
        let state = TreeState::decode(&log.get_latest_root(&ctx(), 1).await.unwrap()).unwrap();
        assert_eq!(state.size, 2);
        assert_eq!(log.size(), 5);
    }
}
