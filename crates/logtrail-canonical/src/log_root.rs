//! LogRootV1 tree state.
//!
//! The Log Service returns its latest root as a big-endian, TLS-style
//! encoding:
//!
//! ```text
//! u16 version (= 1)
//! u64 tree_size
//! u8  root_hash length, root_hash bytes (at most 128)
//! u64 timestamp_nanos
//! u64 revision
//! u16 metadata length, metadata bytes
//! ```
//!
//! A payload that does not decode exactly is structural corruption, never a
//! transient state.

use crate::errors::LogRootError;

/// Only supported LogRoot version.
pub const LOG_ROOT_V1: u16 = 1;

/// Maximum root hash length allowed by the encoding.
pub const MAX_ROOT_HASH_LEN: usize = 128;

/// Authoritative summary of the log at an instant, as served by the Log Service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeState {
    /// Number of leaves in the tree.
    pub size: u64,
    /// Merkle root hash over `size` leaves.
    pub root_hash: Vec<u8>,
    /// Time the root was produced, in nanoseconds since the Unix epoch.
    pub timestamp_nanos: u64,
    /// Log revision counter.
    pub revision: u64,
    /// Opaque operator metadata.
    pub metadata: Vec<u8>,
}

impl TreeState {
    /// Decodes a serialized LogRootV1.
    ///
    /// # Errors
    ///
    /// Returns [`LogRootError`] on truncation, an unknown version, or
    /// trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, LogRootError> {
        let mut r = Reader { buf: bytes };
        let version = r.u16("version")?;
        if version != LOG_ROOT_V1 {
            return Err(LogRootError::UnsupportedVersion(version));
        }
        let size = r.u64("tree_size")?;
        let hash_len = r.take(1, "root_hash length")?[0] as usize;
        if hash_len > MAX_ROOT_HASH_LEN {
            return Err(LogRootError::FieldTooLong {
                field: "root_hash",
                len: hash_len,
                max: MAX_ROOT_HASH_LEN,
            });
        }
        let root_hash = r.take(hash_len, "root_hash")?.to_vec();
        let timestamp_nanos = r.u64("timestamp_nanos")?;
        let revision = r.u64("revision")?;
        let meta_len = r.u16("metadata length")? as usize;
        let metadata = r.take(meta_len, "metadata")?.to_vec();

        if !r.buf.is_empty() {
            return Err(LogRootError::TrailingData(r.buf.len()));
        }

        Ok(Self {
            size,
            root_hash,
            timestamp_nanos,
            revision,
            metadata,
        })
    }

    /// Encodes the state as LogRootV1.
    pub fn encode(&self) -> Result<Vec<u8>, LogRootError> {
        if self.root_hash.len() > MAX_ROOT_HASH_LEN {
            return Err(LogRootError::FieldTooLong {
                field: "root_hash",
                len: self.root_hash.len(),
                max: MAX_ROOT_HASH_LEN,
            });
        }
        if self.metadata.len() > u16::MAX as usize {
            return Err(LogRootError::FieldTooLong {
                field: "metadata",
                len: self.metadata.len(),
                max: u16::MAX as usize,
            });
        }

        let mut out =
            Vec::with_capacity(29 + self.root_hash.len() + self.metadata.len());
        out.extend_from_slice(&LOG_ROOT_V1.to_be_bytes());
        out.extend_from_slice(&self.size.to_be_bytes());
        out.push(self.root_hash.len() as u8);
        out.extend_from_slice(&self.root_hash);
        out.extend_from_slice(&self.timestamp_nanos.to_be_bytes());
        out.extend_from_slice(&self.revision.to_be_bytes());
        out.extend_from_slice(&(self.metadata.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.metadata);
        Ok(out)
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], LogRootError> {
        if self.buf.len() < n {
            return Err(LogRootError::Truncated { field });
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, LogRootError> {
        let b = self.take(2, field)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, LogRootError> {
        let b = self.take(8, field)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }
}
