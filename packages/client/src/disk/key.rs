//! Storage key normalization
//!
//! The store only accepts keys matching `[a-z0-9_-]{1,120}` because they become file
//! names. Caller keys (usually URLs) are hashed with blake3 and the first 64 bits are
//! hex-encoded. Two caller keys that collide share one slot and the last write wins;
//! for a best-effort cache that is an accepted trade-off.

use crate::error::{Result, StorageError};

/// Longest key the store accepts
pub const MAX_KEY_LEN: usize = 120;

/// Digest bytes kept in a hashed key (16 hex chars)
const HASHED_KEY_BYTES: usize = 8;

/// Hash an arbitrary caller key into a storage-safe identifier
#[must_use]
pub fn hash_key(key: &str) -> String {
    let digest = blake3::hash(key.as_bytes());
    hex::encode(&digest.as_bytes()[..HASHED_KEY_BYTES])
}

/// Whether `key` can be used as a store key as-is
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!(
            "keys must match [a-z0-9_-]{{1,{MAX_KEY_LEN}}}: \"{key}\""
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_keys_are_valid_and_stable() {
        let url = "https://api.example.com/v1/elements/sessions?locale=en-US&type=payment";
        let hashed = hash_key(url);
        assert_eq!(hashed.len(), 16);
        assert!(is_valid_key(&hashed));
        assert_eq!(hashed, hash_key(url));
        assert_ne!(hashed, hash_key("https://api.example.com/v1/other"));
    }

    #[test]
    fn raw_urls_are_not_valid_keys() {
        assert!(!is_valid_key("https://example.com"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("UPPER"));
        assert!(!is_valid_key(&"a".repeat(MAX_KEY_LEN + 1)));
        assert!(is_valid_key(&"a".repeat(MAX_KEY_LEN)));
        assert!(is_valid_key("key_1-b"));
    }

    #[test]
    fn invalid_key_error_names_the_key() {
        let err = validate_key("a b").unwrap_err();
        assert!(err.to_string().contains("\"a b\""));
    }
}
