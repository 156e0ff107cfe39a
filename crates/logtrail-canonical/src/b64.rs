//! Hash bytes travel as standard base64 strings in JSON, matching checkpoint
//! text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a byte vector as a base64 string.
pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// Deserializes a byte vector from a base64 string.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    STANDARD.decode(s).map_err(serde::de::Error::custom)
}

/// Base64 encoding for a sequence of hashes.
pub mod list {
    use super::*;
    use serde::ser::SerializeSeq;

    /// Serializes each hash as a base64 string.
    pub fn serialize<S: Serializer>(hashes: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(hashes.len()))?;
        for h in hashes {
            seq.serialize_element(&STANDARD.encode(h))?;
        }
        seq.end()
    }

    /// Deserializes a list of base64 strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Base64 encoding for fixed-size hashes.
pub mod fixed {
    use super::*;
    use crate::digest::HASH_SIZE;

    /// Serializes a fixed-size hash as a base64 string.
    pub fn serialize<S: Serializer>(
        bytes: &[u8; HASH_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        super::serialize(bytes, serializer)
    }

    /// Deserializes a fixed-size hash, rejecting any other length.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; HASH_SIZE], D::Error> {
        let bytes = super::deserialize(deserializer)?;
        <[u8; HASH_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::invalid_length(bytes.len(), &"a 32-byte hash")
        })
    }
}
