use std::future::Future;
use std::sync::Arc;

use logtrail_canonical::Checkpoint;
use logtrail_note::{sign_note, Signer};
use tracing::{debug, info};

use crate::config::PersonalityConfig;
use crate::context::RequestContext;
use crate::errors::{LogServiceError, PersonalityError};
use crate::log_service::{Connector, LogService};
use crate::signed::SignedCheckpoint;

/// Coordination layer in front of a Log Service.
///
/// A personality holds shared handles to the Log Service and its signers and
/// keeps no per-request state, so one instance can serve concurrent requests
/// behind an `Arc`.
pub struct Personality {
    pub(crate) log: Arc<dyn LogService>,
    signers: Vec<Arc<dyn Signer>>,
    pub(crate) config: PersonalityConfig,
}

impl std::fmt::Debug for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.signers.iter().map(|s| s.name()).collect();
        f.debug_struct("Personality")
            .field("config", &self.config)
            .field("signers", &names)
            .finish_non_exhaustive()
    }
}

impl Personality {
    /// Builds a personality over an established Log Service handle.
    ///
    /// # Errors
    ///
    /// Returns [`PersonalityError::Config`] if `config` fails validation.
    pub fn new(
        config: PersonalityConfig,
        log: Arc<dyn LogService>,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, PersonalityError> {
        config.validate()?;
        Ok(Self {
            log,
            signers: vec![signer],
            config,
        })
    }

    /// Connects to `config.log_addr` through `connector` and builds a
    /// personality over the resulting handle.
    ///
    /// The connection attempt is bounded by `connect_timeout`.
    pub async fn connect(
        config: PersonalityConfig,
        connector: &dyn Connector,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, PersonalityError> {
        config.validate()?;
        debug!(addr = %config.log_addr, tree_id = config.tree_id, "connecting to log service");
        let log = match tokio::time::timeout(
            config.connect_timeout(),
            connector.connect(&config.log_addr),
        )
        .await
        {
            Ok(Ok(log)) => log,
            Ok(Err(err)) => return Err(PersonalityError::Connectivity(err)),
            Err(_) => {
                return Err(PersonalityError::Connectivity(LogServiceError::Unavailable(
                    format!(
                        "connecting to {} timed out after {:?}",
                        config.log_addr,
                        config.connect_timeout()
                    ),
                )))
            }
        };
        info!(addr = %config.log_addr, tree_id = config.tree_id, "connected to log service");
        Self::new(config, log, signer)
    }

    /// Adds a countersigning identity; every checkpoint is signed by all
    /// signers in the order they were added.
    pub fn with_cosigner(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signers.push(signer);
        self
    }

    /// The configuration this personality was built with.
    pub fn config(&self) -> &PersonalityConfig {
        &self.config
    }

    /// Runs a Log Service call under `ctx`, mapping its failure.
    pub(crate) async fn call<T, F>(
        &self,
        ctx: &RequestContext,
        fut: F,
    ) -> Result<T, PersonalityError>
    where
        F: Future<Output = Result<T, LogServiceError>>,
    {
        Ok(ctx.run(fut).await??)
    }

    /// Signs the canonical text of `checkpoint` with every signer.
    pub(crate) fn sign(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<SignedCheckpoint, PersonalityError> {
        let signers: Vec<&dyn Signer> = self.signers.iter().map(|s| s.as_ref()).collect();
        let note = sign_note(&checkpoint.to_text(), &signers)?;
        Ok(SignedCheckpoint::from_bytes(note))
    }
}
