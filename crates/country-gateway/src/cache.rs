//! Response cache with per-entry TTL and lazy expiry.
//!
//! Keys are deterministic fingerprints of the logical request (method, path,
//! normalized query parameters), so identical requests always hit the same
//! entry. Expiry is checked at read time; there is no background sweep.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use md5::{Digest, Md5};
use serde_json::Value;

struct CacheEntry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }
}

/// Process-wide response cache.
///
/// Entries are immutable once written; a key collision overwrites, never
/// merges. Lives for the process lifetime, injectable so tests get a fresh
/// store each.
#[derive(Default)]
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl CacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key, returning `None` if absent or expired.
    ///
    /// Expired entries are removed on lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove(key);
        }
        None
    }

    /// Store a value under a key. Always overwrites; never errors.
    pub fn put(&self, key: &str, value: Value, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry { value, created_at: Instant::now(), ttl });
    }

    /// Number of entries currently held, including not-yet-swept stale ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a deterministic fingerprint for a request.
    ///
    /// Query pairs are sorted by key (then value) and keys are
    /// ASCII-lowercased before hashing, so parameter order and key casing
    /// never split the cache. Values are hashed as-is: parameters with
    /// case-sensitive semantics (such as field selection) must not collide,
    /// and case-insensitive ones are normalized by the caller.
    #[must_use]
    pub fn fingerprint(method: &str, path: &str, params: &[(String, String)]) -> String {
        let mut normalized: Vec<(String, String)> =
            params.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.clone())).collect();
        normalized.sort();

        let mut hasher = Md5::new();
        hasher.update(method.to_ascii_uppercase().as_bytes());
        hasher.update(b"|");
        hasher.update(path.as_bytes());
        hasher.update(b"|");
        for (k, v) in &normalized {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").field("entries", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = CacheStore::new();
        cache.put("k", json!({"a": 1}), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache = CacheStore::new();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_expired_entry_is_miss_and_removed() {
        let cache = CacheStore::new();
        cache.put("k", json!(1), Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = CacheStore::new();
        cache.put("k", json!(1), Duration::from_secs(60));
        cache.put("k", json!(2), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fingerprint_ignores_param_order_and_key_case() {
        let a = CacheStore::fingerprint(
            "GET",
            "/api/countries",
            &[("page".into(), "1".into()), ("search".into(), "united".into())],
        );
        let b = CacheStore::fingerprint(
            "get",
            "/api/countries",
            &[("Search".into(), "united".into()), ("page".into(), "1".into())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_keeps_value_case() {
        let a = CacheStore::fingerprint(
            "GET",
            "/api/countries/france",
            &[("fields".into(), "name".into())],
        );
        let b = CacheStore::fingerprint(
            "GET",
            "/api/countries/france",
            &[("fields".into(), "Name".into())],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_distinguishes_requests() {
        let a = CacheStore::fingerprint("GET", "/api/countries", &[("page".into(), "1".into())]);
        let b = CacheStore::fingerprint("GET", "/api/countries", &[("page".into(), "2".into())]);
        let c = CacheStore::fingerprint("GET", "/api/countries/france", &[]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
