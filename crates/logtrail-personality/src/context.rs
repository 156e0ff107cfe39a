//! Per-request cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::errors::PersonalityError;

/// Cancellation signal and optional deadline supplied by the caller.
///
/// Every remote call made on behalf of a request is raced against its
/// context. Clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no deadline that is never cancelled unless asked.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    /// A context driven by an existing cancellation token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Sets the deadline, keeping an earlier one if already present.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The caller's deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Signals cancellation to every holder of this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns whether the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes when the request is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Runs `fut` unless the request is cancelled or its deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, PersonalityError> {
        let deadline = async {
            match self.deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PersonalityError::Cancelled),
            _ = deadline => Err(PersonalityError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
