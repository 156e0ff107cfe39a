//! Ed25519 note keys.
//!
//! Encodings follow the signed-note conventions:
//!
//! ```text
//! signer key:   PRIVATE+KEY+<name>+<hash as %08x>+<base64(0x01 || seed)>
//! verifier key: <name>+<hash as %08x>+<base64(0x01 || public key)>
//! ```
//!
//! The key hash is the first four bytes of `sha256(name || "\n" || 0x01 || public key)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use once_cell::sync::Lazy;
use rand_core::CryptoRngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::errors::{NoteError, SignerError};
use crate::{Signer, Verifier};

/// Algorithm byte for ed25519 keys.
pub const ALG_ED25519: u8 = 1;

const PRIVATE_KEY_PREFIX: &str = "PRIVATE+KEY+";

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s+]+$").expect("invalid regex"));

/// Returns whether `name` is usable as a signer name.
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// Computes the key hash for an ed25519 public key.
pub fn key_hash(name: &str, public_key: &[u8; 32]) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\n");
    hasher.update([ALG_ED25519]);
    hasher.update(public_key);
    let digest = hasher.finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn encode_key(alg: u8, key: &[u8; 32]) -> String {
    let mut bytes = Vec::with_capacity(33);
    bytes.push(alg);
    bytes.extend_from_slice(key);
    STANDARD.encode(bytes)
}

/// Splits `<name>+<hash>+<key>` and decodes the key bytes.
fn decode_parts(encoded: &str) -> Result<(String, u32, [u8; 32]), NoteError> {
    let mut parts = encoded.splitn(3, '+');
    let (Some(name), Some(hash), Some(key)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(NoteError::MalformedKey("expected name+hash+key"));
    };
    if !is_valid_name(name) {
        return Err(NoteError::InvalidName(name.to_string()));
    }
    if hash.len() != 8 {
        return Err(NoteError::MalformedKey("key hash must be 8 hex digits"));
    }
    let hash = u32::from_str_radix(hash, 16)
        .map_err(|_| NoteError::MalformedKey("key hash must be 8 hex digits"))?;
    let key = STANDARD
        .decode(key)
        .map_err(|_| NoteError::MalformedKey("key is not base64"))?;
    let (alg, key) = key
        .split_first()
        .ok_or(NoteError::MalformedKey("key is empty"))?;
    if *alg != ALG_ED25519 {
        return Err(NoteError::UnsupportedAlgorithm(*alg));
    }
    let key: [u8; 32] = key
        .try_into()
        .map_err(|_| NoteError::MalformedKey("ed25519 key must be 32 bytes"))?;
    Ok((name.to_string(), hash, key))
}

/// Generates a fresh key pair, returning `(signer key, verifier key)` encodings.
pub fn generate_key<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    name: &str,
) -> Result<(String, String), NoteError> {
    if !is_valid_name(name) {
        return Err(NoteError::InvalidName(name.to_string()));
    }
    let signing = SigningKey::generate(rng);
    let public = signing.verifying_key().to_bytes();
    let hash = key_hash(name, &public);
    let skey = format!(
        "{}{}+{:08x}+{}",
        PRIVATE_KEY_PREFIX,
        name,
        hash,
        encode_key(ALG_ED25519, &signing.to_bytes())
    );
    let vkey = format!("{}+{:08x}+{}", name, hash, encode_key(ALG_ED25519, &public));
    Ok((skey, vkey))
}

/// Ed25519 [`Signer`] for checkpoint notes.
pub struct NoteSigner {
    name: String,
    key_hash: u32,
    key: SigningKey,
}

impl NoteSigner {
    /// Creates a signer from a name and a 32-byte ed25519 seed.
    pub fn new(name: impl Into<String>, seed: &[u8; 32]) -> Result<Self, NoteError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(NoteError::InvalidName(name));
        }
        let key = SigningKey::from_bytes(seed);
        let key_hash = key_hash(&name, &key.verifying_key().to_bytes());
        Ok(Self {
            name,
            key_hash,
            key,
        })
    }

    /// Parses an encoded signer key (`PRIVATE+KEY+name+hash+key`).
    pub fn from_encoded(skey: &str) -> Result<Self, NoteError> {
        let rest = skey
            .strip_prefix(PRIVATE_KEY_PREFIX)
            .ok_or(NoteError::MalformedKey("missing PRIVATE+KEY prefix"))?;
        let (name, encoded, seed) = decode_parts(rest)?;
        let signer = Self::new(name, &seed)?;
        if signer.key_hash != encoded {
            return Err(NoteError::KeyHashMismatch {
                name: signer.name,
                encoded,
                computed: signer.key_hash,
            });
        }
        Ok(signer)
    }

    /// Returns the matching verifier.
    pub fn verifier(&self) -> NoteVerifier {
        NoteVerifier {
            name: self.name.clone(),
            key_hash: self.key_hash,
            key: self.key.verifying_key(),
        }
    }
}

impl std::fmt::Debug for NoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSigner")
            .field("name", &self.name)
            .field("key_hash", &format_args!("{:08x}", self.key_hash))
            .finish_non_exhaustive()
    }
}

impl Signer for NoteSigner {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_hash(&self) -> u32 {
        self.key_hash
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.key.sign(msg).to_bytes().to_vec())
    }
}

/// Ed25519 [`Verifier`] for checkpoint notes.
#[derive(Debug, Clone)]
pub struct NoteVerifier {
    name: String,
    key_hash: u32,
    key: VerifyingKey,
}

impl NoteVerifier {
    /// Parses an encoded verifier key (`name+hash+key`).
    pub fn from_encoded(vkey: &str) -> Result<Self, NoteError> {
        let (name, encoded, public) = decode_parts(vkey)?;
        let computed = key_hash(&name, &public);
        if computed != encoded {
            return Err(NoteError::KeyHashMismatch {
                name,
                encoded,
                computed,
            });
        }
        let key = VerifyingKey::from_bytes(&public)
            .map_err(|_| NoteError::MalformedKey("invalid ed25519 public key"))?;
        Ok(Self {
            name,
            key_hash: computed,
            key,
        })
    }

    /// Renders the verifier key encoding.
    pub fn encoded(&self) -> String {
        format!(
            "{}+{:08x}+{}",
            self.name,
            self.key_hash,
            encode_key(ALG_ED25519, &self.key.to_bytes())
        )
    }
}

impl Verifier for NoteVerifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_hash(&self) -> u32 {
        self.key_hash
    }

    fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        let Ok(sig) = ed25519_dalek::Signature::from_slice(sig) else {
            return false;
        };
        self.key.verify(msg, &sig).is_ok()
    }
}
