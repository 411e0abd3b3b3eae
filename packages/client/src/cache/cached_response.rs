//! Response snapshot stored by the network cache
//!
//! The serialized form is a JSON object with exactly four fields: `code`, `body`,
//! `headers` and `timestamp`. Unknown fields are rejected so that entries written by an
//! incompatible version read back as misses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::directive::{CACHE_CONTROL_HEADER, CacheControl};

/// HTTP response as persisted by the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedResponse {
    /// HTTP status code
    pub code: u16,
    /// Response body, if any
    pub body: Option<String>,
    /// Response headers; names keep the casing the transport delivered
    pub headers: HashMap<String, Vec<String>>,
    /// Epoch millis at which the response was stored
    pub timestamp: i64,
}

impl CachedResponse {
    /// Create a response that has not been stored yet
    #[must_use]
    pub fn new(code: u16, body: Option<String>, headers: HashMap<String, Vec<String>>) -> Self {
        Self {
            code,
            body,
            headers,
            timestamp: 0,
        }
    }

    /// Append a header value
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// All values of a header, matched case-insensitively
    ///
    /// When several spellings of the name are present, an exact match wins, then the
    /// all-lowercase spelling, then the spelling that sorts first.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
            .or_else(|| {
                self.headers
                    .iter()
                    .filter(|(key, _)| key.eq_ignore_ascii_case(name))
                    .min_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, values)| values)
            })
            .map(Vec::as_slice)
    }

    /// First value of a header, matched case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Directives of this response relative to its stored-at timestamp
    #[must_use]
    pub fn cache_control(&self) -> CacheControl {
        CacheControl::from_response(self)
    }

    /// Raw `Cache-Control` header value
    #[must_use]
    pub fn cache_control_header(&self) -> Option<&str> {
        self.header(CACHE_CONTROL_HEADER)
    }
}
