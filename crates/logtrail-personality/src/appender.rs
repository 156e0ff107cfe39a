//! Appending an entry and waiting for the log to incorporate it.
//!
//! The Log Service integrates submitted leaves asynchronously. After
//! submitting, the appender polls the tree until it has grown and an inclusion
//! proof for the submitted leaf exists at the observed size. Growth caused by
//! other writers is not taken as success.

use std::future::Future;

use logtrail_canonical::InclusionProof;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::context::RequestContext;
use crate::errors::PersonalityError;
use crate::leaf::form_leaf;
use crate::log_service::SubmitOutcome;
use crate::personality::Personality;
use crate::signed::SignedCheckpoint;

/// Result of a successful append.
#[derive(Debug, Clone)]
pub struct AppendReceipt {
    /// Signed checkpoint for the first observed tree that includes the entry.
    pub checkpoint: SignedCheckpoint,
    /// Inclusion proof for the entry in that tree.
    pub proof: InclusionProof,
}

impl Personality {
    /// Appends `entry` and returns a signed checkpoint that includes it.
    ///
    /// See [`Personality::append_with_proof`].
    pub async fn append(
        &self,
        ctx: &RequestContext,
        entry: impl Into<Vec<u8>>,
    ) -> Result<SignedCheckpoint, PersonalityError> {
        Ok(self.append_with_proof(ctx, entry).await?.checkpoint)
    }

    /// Appends `entry` and returns the signed checkpoint together with the
    /// entry's inclusion proof.
    ///
    /// Observation is bounded by the earlier of the context deadline and
    /// `observation_timeout`.
    ///
    /// # Errors
    ///
    /// - [`PersonalityError::ObservationTimeout`] if the entry was not seen
    ///   in time. The entry may still be integrated later.
    /// - [`PersonalityError::Integrity`] if the tree reports fewer leaves
    ///   than any size observed earlier in the call.
    /// - [`PersonalityError::Cancelled`] if the caller cancels.
    /// - Any fetch, submit, or proof failure, without retry.
    #[tracing::instrument(skip_all, fields(tree_id = self.config.tree_id))]
    pub async fn append_with_proof(
        &self,
        ctx: &RequestContext,
        entry: impl Into<Vec<u8>>,
    ) -> Result<AppendReceipt, PersonalityError> {
        let tree_id = self.config.tree_id;
        let baseline = self.checkpoint(ctx).await?;
        let baseline_size = baseline.size;

        let leaf = form_leaf(entry);
        let outcome = self
            .call(ctx, self.log.submit_leaf(ctx, tree_id, &leaf))
            .await?;
        debug!(baseline_size, ?outcome, leaf = %leaf.leaf_hash, "leaf submitted");

        let bound = Instant::now() + self.config.observation_timeout();
        let deadline = ctx.deadline().map_or(bound, |d| d.min(bound));
        let mut backoff = Backoff::new(&self.config.backoff);
        let mut last_size = baseline_size;

        for attempt in 1u32.. {
            let checkpoint = match within(ctx, deadline, self.checkpoint(ctx)).await? {
                Some(fetched) => fetched?,
                None => break,
            };
            // `last_size` is the largest size seen in this call.
            if checkpoint.size < last_size {
                warn!(last_size, size = checkpoint.size, "tree shrank during append");
                return Err(PersonalityError::Integrity {
                    previous: last_size,
                    observed: checkpoint.size,
                });
            }
            last_size = checkpoint.size;

            let candidate = checkpoint.size > baseline_size
                || (outcome == SubmitOutcome::Duplicate && checkpoint.size > 0);
            if candidate {
                let lookup = self.inclusion_at(ctx, &leaf.leaf_hash, checkpoint.size);
                match within(ctx, deadline, lookup).await? {
                    Some(Ok(proof)) => {
                        info!(
                            baseline_size,
                            size = checkpoint.size,
                            leaf_index = proof.leaf_index,
                            attempt,
                            "append observed"
                        );
                        let signed = self.sign(&checkpoint)?;
                        return Ok(AppendReceipt {
                            checkpoint: signed,
                            proof,
                        });
                    }
                    Some(Err(err)) if err.is_leaf_not_found() => {
                        debug!(size = checkpoint.size, attempt, "tree grew without our leaf");
                    }
                    Some(Err(err)) => return Err(err),
                    None => break,
                }
            }

            let delay = backoff.next_delay();
            debug!(size = last_size, attempt, ?delay, "waiting for integration");
            if within(ctx, deadline, sleep(delay)).await?.is_none() {
                break;
            }
        }

        warn!(baseline_size, last_size, "append not observed before deadline");
        Err(PersonalityError::ObservationTimeout {
            baseline_size,
            last_size,
        })
    }
}

/// Runs `fut` until `deadline`, returning `None` if the deadline passes first.
///
/// Cancellation of `ctx` takes precedence over both.
async fn within<F: Future>(
    ctx: &RequestContext,
    deadline: Instant,
    fut: F,
) -> Result<Option<F::Output>, PersonalityError> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(PersonalityError::Cancelled),
        _ = sleep_until(deadline) => Ok(None),
        out = fut => Ok(Some(out)),
    }
}
