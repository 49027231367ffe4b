//! Shared TTL cache for tag metadata
//!
//! A thin wrapper around a moka cache storing opaque JSON values with a
//! per-entry time-to-live. The cache is never the system of record:
//! absence is always a valid state and callers recompute on miss.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;
use serde_json::Value;

/// A cached value together with its own time-to-live
#[derive(Clone, Debug)]
struct CacheEntry {
    value: Value,
    ttl: Duration,
}

/// Expiry policy that reads the TTL stored on each entry
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-shared key/value cache with per-entry TTL
///
/// Writes are fire-and-forget and reads that race a write may compute the
/// same value twice; the last write wins. That is acceptable because every
/// cached computation here is idempotent.
pub struct TagCache {
    inner: Cache<String, CacheEntry>,
}

impl TagCache {
    /// Create a cache bounded to `capacity` entries
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner }
    }

    /// Rewrite a raw name into a safe cache key segment
    ///
    /// Cache keys must never contain whitespace or control characters.
    #[must_use]
    pub fn sanitize(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_whitespace() || c.is_control() { '_' } else { c })
            .collect()
    }

    /// Look up a key, returning `None` on miss or expiry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|entry| entry.value)
    }

    /// Store a value under `key` for `ttl`
    pub fn put(&self, key: &str, value: Value, ttl: Duration) {
        self.inner.insert(key.to_string(), CacheEntry { value, ttl });
    }

    /// Get a value, computing and storing it on miss
    ///
    /// Not atomic across concurrent callers: two simultaneous misses may
    /// both run `compute`. Computation failures are returned to the caller
    /// and never cached.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub fn fetch<E, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<Value, E>
    where
        F: FnOnce() -> Result<Value, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let value = compute()?;
        self.put(key, value.clone(), ttl);
        Ok(value)
    }

    /// Batched lookup keyed by `prefix:sanitized(name)`
    ///
    /// Returns a map from each raw name to its value, running `compute`
    /// only for the names that missed.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `compute`.
    pub fn get_multi<E, F>(
        &self,
        names: &[String],
        prefix: &str,
        ttl: Duration,
        mut compute: F,
    ) -> Result<HashMap<String, Value>, E>
    where
        F: FnMut(&str) -> Result<Value, E>,
    {
        let mut results = HashMap::with_capacity(names.len());

        for name in names {
            let key = format!("{prefix}:{}", Self::sanitize(name));
            let value = match self.get(&key) {
                Some(hit) => hit,
                None => {
                    let computed = compute(name)?;
                    self.put(&key, computed.clone(), ttl);
                    computed
                }
            };
            results.insert(name.clone(), value);
        }

        Ok(results)
    }

    /// Number of entries currently held
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::convert::Infallible;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_get_miss_returns_none() {
        let cache = TagCache::new(100);
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_put_then_get() {
        let cache = TagCache::new(100);
        cache.put("tc:foo", json!(3), HOUR);

        assert_eq!(cache.get("tc:foo"), Some(json!(3)));
    }

    #[test]
    fn test_entry_expires() {
        let cache = TagCache::new(100);
        cache.put("tc:foo", json!(3), Duration::from_millis(10));

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("tc:foo"), None);
    }

    #[test]
    fn test_fetch_computes_on_miss_only() {
        let cache = TagCache::new(100);
        let mut calls = 0;

        for _ in 0..3 {
            let value: Result<Value, Infallible> = cache.fetch("k", HOUR, || {
                calls += 1;
                Ok(json!("v"))
            });
            assert_eq!(value.unwrap(), json!("v"));
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_fetch_error_is_not_cached() {
        let cache = TagCache::new(100);

        let first: Result<Value, &str> = cache.fetch("k", HOUR, || Err("store down"));
        assert!(first.is_err());

        // The failed computation must not poison the key
        let second: Result<Value, &str> = cache.fetch("k", HOUR, || Ok(json!(1)));
        assert_eq!(second.unwrap(), json!(1));
    }

    #[test]
    fn test_get_multi_computes_only_missing() {
        let cache = TagCache::new(100);
        cache.put("tc:foo", json!(1), HOUR);

        let names = vec!["foo".to_string(), "bar".to_string()];
        let mut computed = Vec::new();

        let result: Result<_, Infallible> = cache.get_multi(&names, "tc", HOUR, |name| {
            computed.push(name.to_string());
            Ok(json!(0))
        });
        let map = result.unwrap();

        assert_eq!(map.get("foo"), Some(&json!(1)));
        assert_eq!(map.get("bar"), Some(&json!(0)));
        assert_eq!(computed, vec!["bar".to_string()]);
    }

    #[test]
    fn test_sanitize_strips_whitespace() {
        assert_eq!(TagCache::sanitize("foo bar"), "foo_bar");
        assert_eq!(TagCache::sanitize("a\tb\nc"), "a_b_c");
        assert_eq!(TagCache::sanitize("plain"), "plain");
    }

    #[test]
    fn test_put_overwrites() {
        let cache = TagCache::new(100);
        cache.put("k", json!(1), HOUR);
        cache.put("k", json!(2), HOUR);

        assert_eq!(cache.get("k"), Some(json!(2)));
    }
}
