//! HTTP response caching on top of the disk store
//!
//! [`CachedResponse`] is the persisted snapshot, [`NetworkCache`] the façade that decides
//! what gets stored and what may be served, and [`CacheStats`] counts the outcomes.

pub mod cache_stats;
pub mod cached_response;
pub mod network_cache;

pub use cache_stats::{CacheStats, CacheStatsSnapshot};
pub use cached_response::CachedResponse;
pub use network_cache::{DefaultNetworkCache, NetworkCache};
