//! Cache statistics and metrics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for the network cache façade
#[derive(Debug)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: AtomicU64,
    /// Lookups that found nothing on disk
    pub misses: AtomicU64,
    /// Lookups that found an entry whose directives are no longer valid
    pub stale: AtomicU64,
    /// Responses handed to the disk cache; a write the disk cache drops still counts
    pub stores: AtomicU64,
    /// Responses not stored because their directives forbid it
    pub rejected: AtomicU64,
    /// Stored payloads that could not be decoded
    pub decode_failures: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub stores: u64,
    pub rejected: u64,
    pub decode_failures: u64,
}

impl CacheStats {
    /// Create new cache statistics
    #[must_use]
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of lookups served from the cache; stale entries and decode failures count as misses
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let snapshot = self.snapshot();
        let total = snapshot.hits + snapshot.misses + snapshot.stale + snapshot.decode_failures;
        if total == 0 {
            0.0
        } else {
            snapshot.hits as f64 / total as f64
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_have_zero_ratio() {
        assert_eq!(CacheStats::new().hit_ratio(), 0.0);
    }

    #[test]
    fn ratio_counts_stale_as_miss() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_stale();
        stats.record_hit();
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.snapshot().stale, 1);
    }
}
