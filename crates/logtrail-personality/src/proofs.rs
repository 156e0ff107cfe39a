//! Inclusion proofs for entries and consistency updates for stale checkpoints.

use logtrail_canonical::{ConsistencyProof, InclusionProof, LeafHash};
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::errors::{LogServiceError, PersonalityError};
use crate::leaf::form_leaf;
use crate::personality::Personality;
use crate::signed::SignedCheckpoint;

impl Personality {
    /// Proves that `entry` is included in the tree of size `checkpoint_size`.
    ///
    /// If the entry occurs more than once, the proof for its lowest leaf
    /// index is returned.
    ///
    /// # Errors
    ///
    /// [`PersonalityError::Range`] if the entry is absent or the size exceeds
    /// the current tree.
    #[tracing::instrument(skip_all, fields(tree_id = self.config.tree_id, size = checkpoint_size))]
    pub async fn prove_inclusion(
        &self,
        ctx: &RequestContext,
        checkpoint_size: u64,
        entry: impl Into<Vec<u8>>,
    ) -> Result<InclusionProof, PersonalityError> {
        let leaf = form_leaf(entry);
        let proof = self.inclusion_at(ctx, &leaf.leaf_hash, checkpoint_size).await?;
        debug!(leaf_index = proof.leaf_index, path_len = proof.hashes.len(), "inclusion proven");
        Ok(proof)
    }

    /// Signs the current checkpoint and, if the tree grew past `old_size`,
    /// returns the consistency proof from `old_size` to the new size.
    ///
    /// No proof is requested when the size is unchanged. A tree smaller than
    /// `old_size` is reported as [`PersonalityError::Integrity`].
    #[tracing::instrument(skip_all, fields(tree_id = self.config.tree_id, old_size = old_size))]
    pub async fn update_checkpoint(
        &self,
        ctx: &RequestContext,
        old_size: u64,
    ) -> Result<(SignedCheckpoint, Option<ConsistencyProof>), PersonalityError> {
        let checkpoint = self.checkpoint(ctx).await?;
        let new_size = checkpoint.size;
        if new_size < old_size {
            warn!(new_size, "log reports a smaller tree than the caller has seen");
            return Err(PersonalityError::Integrity {
                previous: old_size,
                observed: new_size,
            });
        }

        let proof = if new_size > old_size {
            let tree_id = self.config.tree_id;
            let proof = self
                .call(
                    ctx,
                    self.log.get_consistency_proof(ctx, tree_id, old_size, new_size),
                )
                .await?;
            debug!(new_size, path_len = proof.hashes.len(), "consistency proven");
            Some(proof)
        } else {
            None
        };

        Ok((self.sign(&checkpoint)?, proof))
    }

    /// Looks up `leaf_hash` at `tree_size`, keeping the lowest-index proof.
    pub(crate) async fn inclusion_at(
        &self,
        ctx: &RequestContext,
        leaf_hash: &LeafHash,
        tree_size: u64,
    ) -> Result<InclusionProof, PersonalityError> {
        let tree_id = self.config.tree_id;
        let proofs = self
            .call(
                ctx,
                self.log
                    .get_inclusion_proof_by_hash(ctx, tree_id, leaf_hash, tree_size),
            )
            .await?;
        if proofs.len() > 1 {
            debug!(count = proofs.len(), "leaf hash occurs more than once");
        }
        proofs
            .into_iter()
            .min_by_key(|p| p.leaf_index)
            .ok_or(PersonalityError::Range(LogServiceError::LeafNotFound {
                leaf_hash: *leaf_hash,
                tree_size,
            }))
    }
}
