use logtrail_canonical::Checkpoint;
use logtrail_note::{open_note, Note, Verifier};

use crate::errors::OpenError;

/// Checkpoint text followed by its signature block.
///
/// Produced fresh for every response and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCheckpoint(Vec<u8>);

impl SignedCheckpoint {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Serialized note bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the wrapper, returning the note bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Verifies the signatures and parses the checkpoint text.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::Note`] if no signature verifies and
    /// [`OpenError::Checkpoint`] if the signed text is not a checkpoint.
    pub fn open(&self, verifiers: &[&dyn Verifier]) -> Result<(Checkpoint, Note), OpenError> {
        let note = open_note(&self.0, verifiers)?;
        let checkpoint = Checkpoint::unmarshal(note.text.as_bytes())?;
        Ok((checkpoint, note))
    }
}

impl AsRef<[u8]> for SignedCheckpoint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
