//! Network response cache
//!
//! - `core`: `DefaultNetworkCache` struct and construction
//! - `operations`: put/get/remove with `Cache-Control` semantics
//!
//! Responses are serialized to JSON and kept in an [`LruDiskCache`](crate::disk::LruDiskCache)
//! under the caller's key. Whether a response may be stored, and whether a stored one may
//! still be served, is decided by its directives (see [`CacheControl`](crate::directive::CacheControl)).

pub mod core;
pub mod operations;

pub use self::core::DefaultNetworkCache;

use super::CachedResponse;

/// Cache of HTTP responses keyed by an opaque string, usually the request URL
///
/// All operations are best effort and never fail.
pub trait NetworkCache: Send + Sync {
    /// Stamp `response` with the current time and store it if its directives allow
    fn put(&self, key: &str, response: CachedResponse);

    /// Return the stored response for `key` if it decodes and its directives are still valid
    fn get(&self, key: &str) -> Option<CachedResponse>;

    /// Forget the response stored for `key`
    fn remove(&self, key: &str);
}
