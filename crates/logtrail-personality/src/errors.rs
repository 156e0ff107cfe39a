use logtrail_canonical::{CheckpointError, LeafHash, LogRootError};
use logtrail_note::NoteError;
use thiserror::Error;

/// Errors reported by a [`LogService`](crate::LogService).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogServiceError {
    /// The service could not be reached or dropped the request.
    #[error("log service unavailable: {0}")]
    Unavailable(String),
    /// No leaf with this hash exists in a tree of the requested size.
    #[error("leaf {leaf_hash} not found in tree of size {tree_size}")]
    LeafNotFound {
        /// Leaf hash that was looked up.
        leaf_hash: LeafHash,
        /// Tree size the lookup was constrained to.
        tree_size: u64,
    },
    /// The requested size exceeds the current tree size.
    #[error("requested tree size {requested} exceeds current size {tree_size}")]
    OutOfRange {
        /// Size asked for.
        requested: u64,
        /// Size the tree actually has.
        tree_size: u64,
    },
    /// The request was structurally invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The tree id is not served by this log.
    #[error("unknown tree {0}")]
    UnknownTree(i64),
    /// Any other failure inside the service.
    #[error("log service internal error: {0}")]
    Internal(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    /// An environment variable could not be parsed.
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
    /// TOML configuration failed to parse.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// A configuration value is out of bounds.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Flat error category, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The Log Service was unreachable or failed.
    Connectivity,
    /// The Log Service returned an undecodable tree state.
    Decode,
    /// The requested leaf or size is not present in the log.
    Range,
    /// Growth was not observed before the deadline.
    ObservationTimeout,
    /// The log violated append-only behaviour.
    Integrity,
    /// Signing the checkpoint failed.
    Signing,
    /// The caller cancelled the request.
    Cancelled,
    /// The caller's deadline elapsed during a remote call.
    DeadlineExceeded,
    /// The personality was misconfigured.
    Config,
}

/// Errors returned by personality operations.
#[derive(Debug, Error)]
pub enum PersonalityError {
    /// The Log Service could not be reached or failed the call.
    #[error("log service error: {0}")]
    Connectivity(#[source] LogServiceError),
    /// The Log Service's tree state payload did not decode.
    #[error("malformed tree state from log service: {0}")]
    Decode(#[from] LogRootError),
    /// The requested leaf or tree size is not present in the log.
    #[error("{0}")]
    Range(#[source] LogServiceError),
    /// The tree did not grow to include the entry before the deadline.
    ///
    /// The entry may still be incorporated later; its status is unknown.
    #[error(
        "append not observed: tree at size {last_size} (baseline {baseline_size}) when the deadline passed; entry status unknown"
    )]
    ObservationTimeout {
        /// Tree size before submission.
        baseline_size: u64,
        /// Last tree size observed.
        last_size: u64,
    },
    /// The tree reported a smaller size than one previously seen.
    #[error("tree shrank from size {previous} to {observed}")]
    Integrity {
        /// Size known to the caller.
        previous: u64,
        /// Smaller size reported by the log.
        observed: u64,
    },
    /// The checkpoint could not be signed.
    #[error("signing failed: {0}")]
    Signing(#[from] NoteError),
    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
    /// The caller's deadline elapsed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    /// The personality configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The checkpoint to be signed could not be fetched.
    ///
    /// [`kind`](Self::kind) reports the kind of the wrapped error.
    #[error("failed to fetch checkpoint: {0}")]
    FetchCheckpoint(#[source] Box<PersonalityError>),
}

impl PersonalityError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Range(_) => ErrorKind::Range,
            Self::ObservationTimeout { .. } => ErrorKind::ObservationTimeout,
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Config(_) => ErrorKind::Config,
            Self::FetchCheckpoint(inner) => inner.kind(),
        }
    }

    /// Returns whether the log reported the leaf as absent.
    pub fn is_leaf_not_found(&self) -> bool {
        match self {
            Self::Range(LogServiceError::LeafNotFound { .. }) => true,
            Self::FetchCheckpoint(inner) => inner.is_leaf_not_found(),
            _ => false,
        }
    }

    /// Returns the innermost error, looking through added context.
    pub fn root_cause(&self) -> &PersonalityError {
        match self {
            Self::FetchCheckpoint(inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl From<LogServiceError> for PersonalityError {
    fn from(err: LogServiceError) -> Self {
        match err {
            LogServiceError::LeafNotFound { .. }
            | LogServiceError::OutOfRange { .. }
            | LogServiceError::InvalidArgument(_) => Self::Range(err),
            LogServiceError::Unavailable(_)
            | LogServiceError::UnknownTree(_)
            | LogServiceError::Internal(_) => Self::Connectivity(err),
        }
    }
}

/// Errors from opening a signed checkpoint.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The note failed to parse or verify.
    #[error("note verification failed: {0}")]
    Note(#[from] NoteError),
    /// The verified text is not a checkpoint.
    #[error("invalid checkpoint text: {0}")]
    Checkpoint(#[from] CheckpointError),
}
