//! netcache public API
//!
//! Disk-backed HTTP response cache configured through a fluent builder. Responses are
//! stored and served according to their `Cache-Control` directives.
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use netcache::{CachedResponse, NetCache, NetworkCache};
//!
//! let cache = NetCache::builder()
//!     .directory("/var/cache/my-app/http")
//!     .max_size_bytes(4 * 1024 * 1024)
//!     .build()?;
//!
//! let response = CachedResponse::new(200, Some("{}".to_owned()), HashMap::new())
//!     .with_header("Cache-Control", "max-age=60");
//! cache.put("https://api.example.com/v1/config", response);
//! # Ok::<(), netcache::StorageError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

pub mod builder;

// Re-export all public API components
pub use builder::NetworkCacheBuilder;

// Re-export important types from client package
pub use netcache_client::prelude::*;
pub use netcache_client::{cache, clock, config, directive, disk, error};

/// Main entry point providing static constructors
pub struct NetCache;

impl NetCache {
    /// Create a builder with default configuration
    ///
    /// Shorthand for `NetworkCacheBuilder::new()`
    #[must_use]
    pub fn builder() -> NetworkCacheBuilder {
        NetworkCacheBuilder::new()
    }

    /// Open a cache with default limits in `directory`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be used as a cache store.
    pub fn open(directory: impl Into<PathBuf>) -> Result<DefaultNetworkCache, StorageError> {
        NetworkCacheBuilder::new().directory(directory).build()
    }
}
