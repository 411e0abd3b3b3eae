//! Terminal methods
//!
//! Each method validates the configuration and opens the disk store; the store directory
//! is created if it does not exist yet.

use std::sync::Arc;

use netcache_client::cache::DefaultNetworkCache;
use netcache_client::clock::SystemClock;
use netcache_client::disk::{DiskLruStore, NetworkDiskCache};
use netcache_client::error::Result;

use crate::builder::core::NetworkCacheBuilder;

impl NetworkCacheBuilder {
    /// Open the store and assemble the response cache
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot be opened.
    pub fn build(self) -> Result<DefaultNetworkCache> {
        let disk = self.build_disk()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(DefaultNetworkCache::new(disk, clock))
    }

    /// Open only the string cache, for callers that store their own payloads
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot be opened.
    pub fn build_disk(&self) -> Result<NetworkDiskCache> {
        Ok(NetworkDiskCache::new(self.build_store()?))
    }

    /// Open only the raw store
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot be opened.
    pub fn build_store(&self) -> Result<DiskLruStore> {
        if self.debug_enabled {
            tracing::debug!(
                target: "netcache::cache",
                directory = %self.config.directory.display(),
                max_size_bytes = self.config.max_size_bytes,
                app_version = self.config.app_version,
                compaction_threshold = self.config.compaction_threshold,
                "Opening network cache"
            );
        }
        DiskLruStore::open(&self.config)
    }
}
