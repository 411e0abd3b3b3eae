//! Core DefaultNetworkCache structure and initialization

use std::sync::Arc;

use super::super::cache_stats::CacheStats;
use crate::clock::{Clock, SystemClock};
use crate::config::DiskCacheConfig;
use crate::disk::{LruDiskCache, NetworkDiskCache};
use crate::error::Result;

/// [`NetworkCache`](super::NetworkCache) over a string disk cache
pub struct DefaultNetworkCache<D: LruDiskCache = NetworkDiskCache> {
    /// Backing string store
    pub(super) disk: D,
    /// Source of "now" for stamping and freshness checks
    pub(super) clock: Arc<dyn Clock>,
    /// Cache statistics
    pub(super) stats: CacheStats,
}

impl DefaultNetworkCache<NetworkDiskCache> {
    /// Open a disk-backed cache using the system clock
    ///
    /// # Errors
    ///
    /// Returns an error if the disk store cannot be opened.
    pub fn open(config: &DiskCacheConfig) -> Result<Self> {
        Ok(Self::new(
            NetworkDiskCache::open(config)?,
            Arc::new(SystemClock),
        ))
    }
}

impl<D: LruDiskCache> DefaultNetworkCache<D> {
    pub fn new(disk: D, clock: Arc<dyn Clock>) -> Self {
        Self {
            disk,
            clock,
            stats: CacheStats::default(),
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }
}

impl<D: LruDiskCache + std::fmt::Debug> std::fmt::Debug for DefaultNetworkCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultNetworkCache")
            .field("disk", &self.disk)
            .field("now_millis", &self.clock.now_millis())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
