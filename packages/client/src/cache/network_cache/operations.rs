//! Cache operations for put, get and remove
//!
//! Freshness is always judged against the response's own stored-at timestamp, which `put`
//! overwrites with the clock's current time.

use tracing::{debug, trace, warn};

use super::super::CachedResponse;
use super::NetworkCache;
use super::core::DefaultNetworkCache;
use crate::disk::LruDiskCache;

impl<D: LruDiskCache> NetworkCache for DefaultNetworkCache<D> {
    fn put(&self, key: &str, mut response: CachedResponse) {
        response.timestamp = self.clock.now_millis();

        let directives = response.cache_control();
        if !directives.can_cache() {
            self.stats.record_rejected();
            debug!(
                target: "netcache::cache",
                key,
                cache_control = response.cache_control_header().unwrap_or_default(),
                "Response not cacheable"
            );
            return;
        }

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(err) => {
                warn!(target: "netcache::cache", key, error = %err, "Failed to encode response");
                return;
            }
        };

        // Counts hand-offs; the disk cache may still drop the write.
        self.disk.put(key, &json);
        self.stats.record_store();
        trace!(
            target: "netcache::cache",
            key,
            code = response.code,
            stored_at = response.timestamp,
            "Stored response"
        );
    }

    fn get(&self, key: &str) -> Option<CachedResponse> {
        let Some(json) = self.disk.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let response = match serde_json::from_str::<CachedResponse>(&json) {
            Ok(response) => response,
            Err(err) => {
                self.stats.record_decode_failure();
                debug!(target: "netcache::cache", key, error = %err, "Discarding undecodable entry");
                return None;
            }
        };

        let now = self.clock.now_millis();
        if response.cache_control().is_valid(now) {
            self.stats.record_hit();
            Some(response)
        } else {
            self.stats.record_stale();
            debug!(
                target: "netcache::cache",
                key,
                stored_at = response.timestamp,
                now,
                "Stored response is stale"
            );
            None
        }
    }

    fn remove(&self, key: &str) {
        self.disk.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::clock::ManualClock;

    #[derive(Debug, Default)]
    struct MemoryDisk {
        entries: Mutex<HashMap<String, String>>,
    }

    impl LruDiskCache for MemoryDisk {
        fn put(&self, key: &str, value: &str) {
            self.entries.lock().insert(key.to_owned(), value.to_owned());
        }

        fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().get(key).cloned()
        }

        fn remove(&self, key: &str) {
            self.entries.lock().remove(key);
        }
    }

    fn cache_at(now: i64) -> (DefaultNetworkCache<MemoryDisk>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let cache = DefaultNetworkCache::new(MemoryDisk::default(), clock.clone());
        (cache, clock)
    }

    fn response(cache_control: &str) -> CachedResponse {
        CachedResponse::new(200, Some("{\"id\":1}".to_owned()), HashMap::new())
            .with_header("Cache-Control", cache_control)
    }

    #[test]
    fn fresh_response_is_served() {
        let (cache, clock) = cache_at(0);
        cache.put("https://x/a", response("public, max-age=300"));

        clock.set(300_000);
        let hit = cache.get("https://x/a").expect("fresh hit");
        assert_eq!(hit.timestamp, 0);
        assert_eq!(hit.body.as_deref(), Some("{\"id\":1}"));
        assert_eq!(cache.stats().snapshot().hits, 1);
    }

    #[test]
    fn expired_response_is_not_served() {
        let (cache, clock) = cache_at(0);
        cache.put("k", response("max-age=0"));
        clock.set(300_000);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().snapshot().stale, 1);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let (cache, clock) = cache_at(1_000);
        cache.put("k", response("max-age=1"));
        clock.set(2_000);
        assert!(cache.get("k").is_some());
        clock.set(2_001);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn no_store_is_never_written() {
        let (cache, _clock) = cache_at(0);
        cache.put("k", response("no-store, max-age=600"));
        assert!(cache.disk().entries.lock().is_empty());
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().snapshot().rejected, 1);
    }

    #[test]
    fn no_cache_is_stored_but_never_served() {
        let (cache, _clock) = cache_at(0);
        cache.put("k", response("no-cache"));
        assert_eq!(cache.disk().entries.lock().len(), 1);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn missing_header_never_expires() {
        let (cache, clock) = cache_at(5);
        cache.put("k", CachedResponse::new(204, None, HashMap::new()));
        clock.set(i64::MAX);
        let hit = cache.get("k").expect("hit");
        assert_eq!(hit.code, 204);
        assert_eq!(hit.timestamp, 5);
    }

    #[test]
    fn put_overwrites_caller_timestamp() {
        let (cache, _clock) = cache_at(42);
        let mut stale = response("max-age=10");
        stale.timestamp = -1_000_000;
        cache.put("k", stale);
        assert_eq!(cache.get("k").map(|r| r.timestamp), Some(42));
    }

    #[test]
    fn undecodable_entry_is_a_miss() {
        let (cache, _clock) = cache_at(0);
        cache.disk().put("k", "not json");
        assert_eq!(cache.get("k"), None);
        cache
            .disk()
            .put("k", r#"{"code":200,"body":null,"headers":{},"timestamp":0,"extra":1}"#);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().snapshot().decode_failures, 2);
    }

    #[test]
    fn get_does_not_change_state() {
        let (cache, clock) = cache_at(0);
        cache.put("k", response("max-age=60"));
        clock.set(30_000);
        let first = cache.get("k");
        let second = cache.get("k");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn remove_forgets_entry() {
        let (cache, _clock) = cache_at(0);
        cache.put("k", response("max-age=60"));
        cache.remove("k");
        cache.remove("k");
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().snapshot().misses, 1);
    }

    struct DroppingDisk;

    impl LruDiskCache for DroppingDisk {
        fn put(&self, _key: &str, _value: &str) {}

        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn remove(&self, _key: &str) {}
    }

    #[test]
    fn stores_count_hand_offs_even_when_disk_drops_them() {
        let cache = DefaultNetworkCache::new(DroppingDisk, Arc::new(ManualClock::new(0)));
        cache.put("k", response("max-age=60"));
        assert_eq!(cache.get("k"), None);
        let snapshot = cache.stats().snapshot();
        assert_eq!(snapshot.stores, 1);
        assert_eq!(snapshot.misses, 1);
    }

    #[test]
    fn usable_through_trait_object() {
        let (cache, _clock) = cache_at(0);
        let cache: Box<dyn NetworkCache> = Box::new(cache);
        cache.put("k", response("public"));
        assert!(cache.get("k").is_some());
    }
}
