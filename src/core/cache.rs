//! In-memory response cache with per-lookup expiry.
//!
//! Entries live in an LRU map guarded by a mutex. Each entry remembers when it
//! was stored; a lookup passes the TTL that applies to its endpoint and only
//! gets a value back while the entry is younger than that TTL. Expired entries
//! are left for the LRU to evict or the next `put` to overwrite.

use lru::LruCache;
use serde::Serialize;
use serde_json::Value;
use std::{
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};
use tokio::time::Instant;

/// Cache key: endpoint path plus its query parameters in a canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl RequestKey {
    /// Build a key, sorting parameters so `a=1&b=2` and `b=2&a=1` collide.
    pub fn new(endpoint: &str, params: &[(&str, &str)]) -> Self {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort();
        Self {
            endpoint: endpoint.trim_matches('/').to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedResponse {
    value: Value,
    stored_at: Instant,
}

/// Snapshot of cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct ResponseCache {
    entries: Mutex<LruCache<RequestKey, CachedResponse>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` responses (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<RequestKey, CachedResponse>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value if it was stored less than `ttl` ago.
    pub fn get_fresh(&self, key: &RequestKey, ttl: Duration) -> Option<Value> {
        let fresh = self
            .lock()
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone());

        match fresh {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        fresh
    }

    /// Store a response stamped with the current time.
    pub fn put(&self, key: RequestKey, value: Value) {
        self.lock().put(
            key,
            CachedResponse {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &RequestKey) {
        self.lock().pop(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_key_normalizes_param_order() {
        let a = RequestKey::new("stats/v1/player/search", &[("plrN", "kohli"), ("a", "1")]);
        let b = RequestKey::new("/stats/v1/player/search", &[("a", "1"), ("plrN", "kohli")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_key_distinguishes_values() {
        let a = RequestKey::new("stats/v1/player/search", &[("plrN", "kohli")]);
        let b = RequestKey::new("stats/v1/player/search", &[("plrN", "root")]);
        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_returned() {
        let cache = ResponseCache::new(4);
        let key = RequestKey::new("matches/v1/live", &[]);
        cache.put(key.clone(), json!({"typeMatches": []}));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(
            cache.get_fresh(&key, Duration::from_secs(60)),
            Some(json!({"typeMatches": []}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_not_returned() {
        let cache = ResponseCache::new(4);
        let key = RequestKey::new("matches/v1/live", &[]);
        cache.put(key.clone(), json!(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get_fresh(&key, Duration::from_secs(60)), None);
        // the same entry is still fresh under a longer TTL
        assert_eq!(cache.get_fresh(&key, Duration::from_secs(3600)), Some(json!(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lru_eviction_and_stats() {
        let cache = ResponseCache::new(2);
        let ttl = Duration::from_secs(60);
        let k1 = RequestKey::new("teams/v1/1/players", &[]);
        let k2 = RequestKey::new("teams/v1/2/players", &[]);
        let k3 = RequestKey::new("teams/v1/3/players", &[]);

        cache.put(k1.clone(), json!(1));
        cache.put(k2.clone(), json!(2));
        cache.put(k3.clone(), json!(3));

        assert_eq!(cache.get_fresh(&k1, ttl), None);
        assert_eq!(cache.get_fresh(&k3, ttl), Some(json!(3)));

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ResponseCache::new(4);
        let ttl = Duration::from_secs(60);
        let k1 = RequestKey::new("venues/v1/1", &[]);
        let k2 = RequestKey::new("venues/v1/2", &[]);
        cache.put(k1.clone(), json!(1));
        cache.put(k2.clone(), json!(2));

        cache.invalidate(&k1);
        assert_eq!(cache.get_fresh(&k1, ttl), None);
        assert_eq!(cache.get_fresh(&k2, ttl), Some(json!(2)));

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = ResponseCache::new(0);
        assert_eq!(cache.stats().capacity, 1);
    }
}
