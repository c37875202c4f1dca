//! In-memory memoization of successful API responses, keyed by request.
//!
//! Entries expire after the configured TTL and the cache never holds more than
//! `capacity` responses; the least recently used entry is dropped first.

use lru_time_cache::LruCache;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Snapshot of the cache for `/stats` and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached_items: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
}

/// Bounded TTL cache of JSON payloads. A zero TTL or capacity disables caching.
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<LruCache<String, Value>>,
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(LruCache::with_expiry_duration_and_capacity(
                ttl,
                capacity.max(1),
            )),
        }
    }

    fn enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }

    // A poisoned lock only means another thread panicked mid-insert; the cache is still usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Looks up `key` without extending its lifetime.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled() {
            return None;
        }
        self.lock().peek(key).cloned()
    }

    /// Stores `value`. Inserting also drops every entry that has expired.
    pub fn insert(&self, key: String, value: Value) {
        if !self.enabled() {
            return;
        }
        self.lock().insert(key, value);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_items: if self.enabled() { self.lock().len() } else { 0 },
            capacity: self.capacity,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache key for an endpoint plus its query parameters.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return endpoint.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.to_lowercase()))
        .collect();
    format!("{}?{}", endpoint, query.join("&"))
}
