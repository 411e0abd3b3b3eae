//! Essential types for working with the cache

// Response cache façade
pub use crate::cache::{CacheStats, CacheStatsSnapshot, CachedResponse, DefaultNetworkCache, NetworkCache};

// Directives
pub use crate::directive::{CacheControl, Directive, parse_directives};

// Storage
pub use crate::disk::{DiskLruStore, LruDiskCache, NetworkDiskCache, hash_key};

// Configuration and time
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{DiskCacheConfig, Validator};

// Error types
pub use crate::error::StorageError;
