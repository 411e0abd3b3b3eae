//! Persistent storage layer
//!
//! [`DiskLruStore`] is the journaled, size-bounded engine. [`NetworkDiskCache`] wraps it
//! behind the infallible [`LruDiskCache`] interface the network cache consumes.

mod journal;
pub mod key;
pub mod network_disk_cache;
pub mod store;

pub use key::{MAX_KEY_LEN, hash_key, is_valid_key};
pub use network_disk_cache::{LruDiskCache, NetworkDiskCache};
pub use store::DiskLruStore;
