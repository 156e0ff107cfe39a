//! Reading the latest checkpoint.

use logtrail_canonical::{Checkpoint, TreeState};
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::errors::PersonalityError;
use crate::personality::Personality;
use crate::signed::SignedCheckpoint;

impl Personality {
    /// Returns the log's current checkpoint under the configured origin.
    ///
    /// # Errors
    ///
    /// [`PersonalityError::Connectivity`] if the Log Service call fails, and
    /// [`PersonalityError::Decode`] if the returned tree state is malformed.
    /// Neither is retried.
    #[tracing::instrument(skip_all, fields(tree_id = self.config.tree_id))]
    pub async fn checkpoint(&self, ctx: &RequestContext) -> Result<Checkpoint, PersonalityError> {
        let state = self.tree_state(ctx).await?;
        debug!(size = state.size, revision = state.revision, "fetched tree state");
        Ok(Checkpoint::from_tree_state(&self.config.origin, &state))
    }

    /// Fetches the current checkpoint and signs it.
    ///
    /// Fetch failures are returned as [`PersonalityError::FetchCheckpoint`].
    #[tracing::instrument(skip_all, fields(tree_id = self.config.tree_id))]
    pub async fn signed_checkpoint(
        &self,
        ctx: &RequestContext,
    ) -> Result<SignedCheckpoint, PersonalityError> {
        let checkpoint = match self.checkpoint(ctx).await {
            Ok(cp) => cp,
            Err(err) => {
                warn!(error = %err, "failed to fetch checkpoint");
                return Err(PersonalityError::FetchCheckpoint(Box::new(err)));
            }
        };
        self.sign(&checkpoint)
    }

    async fn tree_state(&self, ctx: &RequestContext) -> Result<TreeState, PersonalityError> {
        let tree_id = self.config.tree_id;
        let raw = self.call(ctx, self.log.get_latest_root(ctx, tree_id)).await?;
        Ok(TreeState::decode(&raw)?)
    }
}
