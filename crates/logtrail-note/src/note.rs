//! Signing and opening notes.
//!
//! A signed note is the note text (ending in a newline), a blank line, and one
//! signature line per signer. Signatures cover the text bytes exactly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashSet;

use crate::errors::NoteError;
use crate::keys::is_valid_name;
use crate::signature::Signature;
use crate::{Signer, Verifier};

/// Prefix of every signature line: an em dash and a space.
const SIG_PREFIX: &str = "\u{2014} ";

/// Upper bound on signature lines parsed from one note.
const MAX_SIGNATURES: usize = 100;

/// A note whose signatures have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Signed text, including its final newline.
    pub text: String,
    /// Signatures verified by a known verifier.
    pub sigs: Vec<Signature>,
    /// Signatures from signers with no known verifier.
    pub unverified_sigs: Vec<Signature>,
}

fn check_text(text: &str) -> Result<(), NoteError> {
    if !text.ends_with('\n') {
        return Err(NoteError::Malformed("text must end in a newline"));
    }
    if text.chars().any(|c| c < '\u{20}' && c != '\n') {
        return Err(NoteError::Malformed("text contains control characters"));
    }
    Ok(())
}

/// Signs `text` with every signer, producing the serialized note.
///
/// # Example
///
/// ```rust
/// use logtrail_note::{open_note, sign_note, NoteSigner};
///
/// let signer = NoteSigner::new("example.com/log", &[7u8; 32])?;
/// let verifier = signer.verifier();
/// let signed = sign_note("checkpoint\n", &[&signer])?;
/// let note = open_note(&signed, &[&verifier])?;
/// assert_eq!(note.text, "checkpoint\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`NoteError`] if the text is malformed, no signers are given, a
/// signer name is invalid, or a signer fails.
pub fn sign_note(text: &str, signers: &[&dyn Signer]) -> Result<Vec<u8>, NoteError> {
    check_text(text)?;
    if signers.is_empty() {
        return Err(NoteError::Malformed("at least one signer is required"));
    }

    let mut sig_block = String::new();
    for signer in signers {
        let name = signer.name();
        if !is_valid_name(name) {
            return Err(NoteError::InvalidName(name.to_string()));
        }
        let sig = signer.sign(text.as_bytes())?;
        let mut raw = signer.key_hash().to_be_bytes().to_vec();
        raw.extend_from_slice(&sig);
        sig_block.push_str(SIG_PREFIX);
        sig_block.push_str(name);
        sig_block.push(' ');
        sig_block.push_str(&STANDARD.encode(raw));
        sig_block.push('\n');
    }

    let mut out = String::with_capacity(text.len() + 1 + sig_block.len());
    out.push_str(text);
    out.push('\n');
    out.push_str(&sig_block);
    Ok(out.into_bytes())
}

/// Parses a signed note and verifies its signatures against `verifiers`.
///
/// Signatures from unknown signers are kept in [`Note::unverified_sigs`];
/// repeated signatures are dropped.
///
/// # Errors
///
/// Returns [`NoteError::InvalidSignature`] if a known verifier rejects its
/// signature, and [`NoteError::Unverified`] if no signature is verified.
pub fn open_note(msg: &[u8], verifiers: &[&dyn Verifier]) -> Result<Note, NoteError> {
    let msg = std::str::from_utf8(msg).map_err(|_| NoteError::Malformed("invalid UTF-8"))?;
    if msg.chars().any(|c| c < '\u{20}' && c != '\n') {
        return Err(NoteError::Malformed("note contains control characters"));
    }

    let split = msg
        .rfind("\n\n")
        .ok_or(NoteError::Malformed("missing signature block"))?;
    let (text, sigs) = (&msg[..split + 1], &msg[split + 2..]);
    if sigs.is_empty() || !sigs.ends_with('\n') {
        return Err(NoteError::Malformed("signature block must end in a newline"));
    }

    let mut note = Note {
        text: text.to_string(),
        sigs: Vec::new(),
        unverified_sigs: Vec::new(),
    };
    let mut seen = HashSet::new();
    let mut seen_unverified = HashSet::new();

    for (count, line) in sigs.lines().enumerate() {
        if count >= MAX_SIGNATURES {
            return Err(NoteError::Malformed("too many signatures"));
        }
        let line = line
            .strip_prefix(SIG_PREFIX)
            .ok_or(NoteError::Malformed("signature line lacks prefix"))?;
        let (name, b64) = line
            .split_once(' ')
            .ok_or(NoteError::Malformed("signature line lacks separator"))?;
        let raw = STANDARD
            .decode(b64)
            .map_err(|_| NoteError::Malformed("signature is not base64"))?;
        if !is_valid_name(name) || raw.len() < 5 {
            return Err(NoteError::Malformed("invalid signature line"));
        }
        let key_hash = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let signature = Signature {
            name: name.to_string(),
            key_hash,
            base64: b64.to_string(),
        };

        let Some(verifier) = verifiers
            .iter()
            .find(|v| v.name() == name && v.key_hash() == key_hash)
        else {
            if seen_unverified.insert(line.to_string()) {
                note.unverified_sigs.push(signature);
            }
            continue;
        };
        if !seen.insert((name.to_string(), key_hash)) {
            continue;
        }
        if !verifier.verify(text.as_bytes(), &raw[4..]) {
            return Err(NoteError::InvalidSignature {
                name: name.to_string(),
                key_hash,
            });
        }
        note.sigs.push(signature);
    }

    if note.sigs.is_empty() {
        return Err(NoteError::Unverified);
    }
    Ok(note)
}
