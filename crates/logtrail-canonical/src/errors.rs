use thiserror::Error;

/// Errors produced while parsing checkpoint text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckpointError {
    /// Text ended before all required lines were read.
    #[error("checkpoint is missing the {0} line")]
    MissingLine(&'static str),
    /// The origin line was empty.
    #[error("checkpoint origin is empty")]
    EmptyOrigin,
    /// The size line is not a canonical decimal `u64`.
    #[error("invalid checkpoint size '{0}'")]
    InvalidSize(String),
    /// The root hash line is not valid standard base64.
    #[error("invalid checkpoint root hash: {0}")]
    InvalidRootHash(String),
    /// The checkpoint text is not valid UTF-8.
    #[error("checkpoint is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors produced while decoding a serialized LogRootV1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogRootError {
    /// Payload ended before the named field was complete.
    #[error("log root truncated while reading {field}")]
    Truncated {
        /// Field being read when input ran out.
        field: &'static str,
    },
    /// Payload declares a version other than 1.
    #[error("unsupported log root version {0}")]
    UnsupportedVersion(u16),
    /// Bytes remain after the last field.
    #[error("log root has {0} trailing bytes")]
    TrailingData(usize),
    /// A variable-length field exceeds its encoding limit.
    #[error("{field} length {len} exceeds maximum {max}")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Errors produced by the reference Merkle algorithms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    /// Leaf index is not inside a tree of the given size.
    #[error("leaf index {index} out of range for tree size {size}")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: u64,
        /// Tree size.
        size: u64,
    },
    /// Consistency range is not `0 <= from <= to <= size`.
    #[error("invalid consistency range {from}..{to} for tree size {size}")]
    InvalidRange {
        /// Older tree size.
        from: u64,
        /// Newer tree size.
        to: u64,
        /// Number of leaves available.
        size: u64,
    },
    /// Audit path has the wrong number of nodes.
    #[error("proof has {actual} hashes, expected {expected}")]
    WrongLength {
        /// Expected number of hashes.
        expected: usize,
        /// Number of hashes supplied.
        actual: usize,
    },
    /// Recomputed root does not match the claimed root.
    #[error("proof does not reproduce the expected root")]
    RootMismatch,
}
