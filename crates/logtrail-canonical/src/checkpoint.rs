//! Checkpoint text.
//!
//! A checkpoint is rendered as three newline-terminated lines:
//!
//! ```text
//! <origin>
//! <size, decimal>
//! <root hash, standard base64>
//! ```
//!
//! The rendered text is signed verbatim, so `marshal` must be deterministic.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::CheckpointError;
use crate::log_root::TreeState;

/// Size and root hash of the log at an instant, labelled with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Log identity string (first line of the checkpoint).
    pub origin: String,
    /// Number of leaves committed to by `root_hash`.
    pub size: u64,
    /// Merkle tree root hash.
    #[serde(with = "crate::b64")]
    pub root_hash: Vec<u8>,
}

impl Checkpoint {
    /// Builds a checkpoint from a decoded tree state.
    pub fn from_tree_state(origin: impl Into<String>, state: &TreeState) -> Self {
        Self {
            origin: origin.into(),
            size: state.size,
            root_hash: state.root_hash.clone(),
        }
    }

    /// Renders the canonical checkpoint text.
    ///
    /// # Example
    ///
    /// ```rust
    /// use logtrail_canonical::Checkpoint;
    ///
    /// let cp = Checkpoint { origin: "Hello World Log".into(), size: 1, root_hash: vec![0; 32] };
    /// assert_eq!(
    ///     cp.marshal(),
    ///     b"Hello World Log\n1\nAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\n".to_vec()
    /// );
    /// ```
    pub fn marshal(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    /// Renders the canonical checkpoint text as a string.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.origin,
            self.size,
            STANDARD.encode(&self.root_hash)
        )
    }

    /// Parses checkpoint text produced by [`Checkpoint::marshal`].
    ///
    /// Lines after the root hash are extension lines and are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError`] if a required line is missing, the size
    /// is not a canonical decimal, or the root hash is not valid base64.
    pub fn unmarshal(text: &[u8]) -> Result<Self, CheckpointError> {
        let text = std::str::from_utf8(text).map_err(|_| CheckpointError::InvalidUtf8)?;
        let mut lines = text.split_inclusive('\n');

        let origin = take_line(&mut lines, "origin")?;
        if origin.is_empty() {
            return Err(CheckpointError::EmptyOrigin);
        }

        let size_line = take_line(&mut lines, "size")?;
        let size = parse_size(size_line)?;

        let hash_line = take_line(&mut lines, "root hash")?;
        let root_hash = STANDARD
            .decode(hash_line)
            .map_err(|e| CheckpointError::InvalidRootHash(e.to_string()))?;

        Ok(Self {
            origin: origin.to_string(),
            size,
            root_hash,
        })
    }
}

/// Returns the next line without its terminator; unterminated lines count as missing.
fn take_line<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<&'a str, CheckpointError> {
    lines
        .next()
        .and_then(|l| l.strip_suffix('\n'))
        .ok_or(CheckpointError::MissingLine(what))
}

fn parse_size(line: &str) -> Result<u64, CheckpointError> {
    let canonical = !line.is_empty()
        && line.bytes().all(|b| b.is_ascii_digit())
        && (line == "0" || !line.starts_with('0'));
    if !canonical {
        return Err(CheckpointError::InvalidSize(line.to_string()));
    }
    line.parse()
        .map_err(|_| CheckpointError::InvalidSize(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Checkpoint {
        Checkpoint {
            origin: "Hello World Log".to_string(),
            size: 11,
            root_hash: (0u8..32).collect(),
        }
    }

    #[test]
    fn equal_checkpoints_marshal_identically() {
        assert_eq!(sample().marshal(), sample().clone().marshal());
    }

    #[test]
    fn unmarshal_inverts_marshal() {
        let cp = sample();
        assert_eq!(Checkpoint::unmarshal(&cp.marshal()).unwrap(), cp);
    }

    #[test]
    fn unmarshal_ignores_extension_lines() {
        let mut text = sample().marshal();
        text.extend_from_slice(b"extension\n");
        assert_eq!(Checkpoint::unmarshal(&text).unwrap(), sample());
    }

    #[test]
    fn unmarshal_rejects_missing_hash() {
        let err = Checkpoint::unmarshal(b"origin\n5\n").unwrap_err();
        assert_eq!(err, CheckpointError::MissingLine("root hash"));
    }

    #[test]
    fn unmarshal_rejects_unterminated_hash() {
        let err = Checkpoint::unmarshal(b"origin\n5\nAAAA").unwrap_err();
        assert_eq!(err, CheckpointError::MissingLine("root hash"));
    }

    #[test]
    fn unmarshal_rejects_non_canonical_sizes() {
        for bad in ["05", "-1", "", "1e3", "18446744073709551616"] {
            let text = format!("origin\n{}\nAAAA\n", bad);
            assert!(
                matches!(
                    Checkpoint::unmarshal(text.as_bytes()),
                    Err(CheckpointError::InvalidSize(_))
                ),
                "accepted size {:?}",
                bad
            );
        }
    }

    #[test]
    fn unmarshal_rejects_bad_base64() {
        let err = Checkpoint::unmarshal(b"origin\n5\n!!!\n").unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidRootHash(_)));
    }
}
