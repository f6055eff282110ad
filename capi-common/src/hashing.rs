//! Personal-data hashing as the destination APIs require it.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the trimmed, lower-cased input. Every destination
/// that accepts hashed personal data normalizes this way before hashing.
pub fn sha256_lower(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash an optional field, preserving absence.
pub fn hash_opt(value: Option<&str>) -> Option<String> {
    value.map(sha256_lower)
}

/// Hash an optional field into the single-element array shape Pinterest's
/// API expects, as a JSON value (null when absent, removed by deep-clean).
pub fn hash_opt_array(value: Option<&str>) -> Value {
    match value {
        Some(value) => Value::Array(vec![Value::String(sha256_lower(value))]),
        None => Value::Null,
    }
}
