//! String cache over [`DiskLruStore`] with caller-friendly keys

use std::sync::Arc;

use tracing::warn;

use super::key::hash_key;
use super::store::DiskLruStore;
use crate::config::DiskCacheConfig;
use crate::error::Result;

/// Best-effort string cache
///
/// Implementations never fail: a write that cannot be persisted is dropped and a read
/// that cannot be served is a miss.
pub trait LruDiskCache: Send + Sync {
    fn put(&self, key: &str, value: &str);
    fn get(&self, key: &str) -> Option<String>;
    fn remove(&self, key: &str);
}

impl<T: LruDiskCache + ?Sized> LruDiskCache for Arc<T> {
    fn put(&self, key: &str, value: &str) {
        (**self).put(key, value);
    }

    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// [`LruDiskCache`] backed by a [`DiskLruStore`]
///
/// Any string is accepted as a key; it is hashed with [`hash_key`] before reaching the
/// store. Store errors are logged under `netcache::disk` and swallowed.
#[derive(Debug)]
pub struct NetworkDiskCache {
    store: DiskLruStore,
}

impl NetworkDiskCache {
    /// Open the underlying store
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened; see [`DiskLruStore::open`].
    pub fn open(config: &DiskCacheConfig) -> Result<Self> {
        Ok(Self::new(DiskLruStore::open(config)?))
    }

    #[must_use]
    pub fn new(store: DiskLruStore) -> Self {
        Self { store }
    }

    /// Underlying store, for size queries and maintenance
    #[must_use]
    pub fn store(&self) -> &DiskLruStore {
        &self.store
    }
}

impl LruDiskCache for NetworkDiskCache {
    fn put(&self, key: &str, value: &str) {
        let hashed = hash_key(key);
        if let Err(err) = self.store.put(&hashed, value) {
            warn!(
                target: "netcache::disk",
                key,
                hashed = %hashed,
                error = %err,
                "Failed to write cache entry"
            );
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let hashed = hash_key(key);
        match self.store.get(&hashed) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    target: "netcache::disk",
                    key,
                    hashed = %hashed,
                    error = %err,
                    "Failed to read cache entry"
                );
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        let hashed = hash_key(key);
        if let Err(err) = self.store.remove(&hashed) {
            warn!(
                target: "netcache::disk",
                key,
                hashed = %hashed,
                error = %err,
                "Failed to remove cache entry"
            );
        }
    }
}
