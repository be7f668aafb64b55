//! Canonical serialization and content fingerprints.
//!
//! ## Determinism Guarantees
//!
//! - Same logical content -> byte-identical serialization, regardless of the
//!   order in which map keys or object fields were produced
//! - Same bytes -> same fingerprint (SHA256, hex-encoded)
//!
//! Fingerprints are used for change detection only.

use crate::errors::{JapiError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identity of the serialization + hash scheme. Fingerprints are only
/// comparable between writers using the same codec.
pub const CODEC_ID: &str = "sha256/canonical-json/v1";

/// Length of a hex-encoded SHA256 digest.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Hex-encoded SHA256 digest of canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a stored fingerprint.
    ///
    /// Surrounding whitespace is ignored; anything other than 64 hex digits
    /// is rejected. Upper-case digits are normalized to lower case.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() == FINGERPRINT_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes payloads canonically and fingerprints the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintCodec;

impl FingerprintCodec {
    /// Canonical JSON bytes for `payload`.
    ///
    /// # Errors
    ///
    /// `PayloadUnserializable` if the payload cannot be represented as JSON
    /// (e.g. a map with non-string keys, or a failing `Serialize` impl).
    pub fn serialize<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Vec<u8>> {
        let value = serde_json::to_value(payload).map_err(|e| JapiError::PayloadUnserializable {
            message: e.to_string(),
        })?;
        let canonical = canonicalize(value);
        Ok(serde_json::to_vec(&canonical)?)
    }

    /// SHA256 fingerprint of already-serialized bytes.
    pub fn fingerprint(&self, bytes: &[u8]) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Serialize and fingerprint in one step.
    ///
    /// # Errors
    ///
    /// `PayloadUnserializable`, see [`FingerprintCodec::serialize`].
    pub fn encode<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(Vec<u8>, Fingerprint)> {
        let bytes = self.serialize(payload)?;
        let fingerprint = self.fingerprint(&bytes);
        Ok((bytes, fingerprint))
    }
}

/// Rebuild every object with its keys in sorted order.
///
/// Arrays keep their order: element order is content.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
