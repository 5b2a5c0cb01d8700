// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Concurrent TTL caching for parsed artifacts.
//!
//! [`TtlCache`] is the primitive under the storage layer's three caches
//! (definitions, templates, raw files). Entries expire a fixed duration
//! after insertion. Expiry is enforced lazily on [`get`](TtlCache::get)
//! and in bulk by [`purge_expired`](TtlCache::purge_expired), which the
//! owning store runs on its cleanup interval. Change-driven invalidation
//! uses point [`remove`](TtlCache::remove); the two mechanisms are
//! independent and either may drop an entry.
//!
//! The backing map is sharded, so concurrent readers never block each
//! other and writers only contend per key.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A concurrent path-keyed cache with per-entry time-to-live.
#[derive(Debug)]
pub(crate) struct TtlCache<V> {
    entries: DashMap<PathBuf, CacheEntry<V>>,
    ttl: Duration,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    deadline: Instant,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache whose entries live for `ttl` after insertion.
    pub fn new(ttl: Duration) -> TtlCache<V> {
        TtlCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a live entry, dropping and missing on an expired one.
    pub fn get(&self, key: &Path) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.deadline <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores `value` under `key` with a fresh deadline.
    pub fn insert(&self, key: PathBuf, value: V) {
        let deadline = Instant::now() + self.ttl;
        self.entries.insert(key, CacheEntry { value, deadline });
    }

    /// Point-evicts `key`.
    pub fn remove(&self, key: &Path) {
        self.entries.remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drops entries whose deadline has passed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.deadline > now);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_and_remove() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(PathBuf::from("a"), 1);
        assert_eq!(cache.get(Path::new("a")), Some(1));
        assert_eq!(cache.get(Path::new("b")), None);
        cache.remove(Path::new("a"));
        assert_eq!(cache.get(Path::new("a")), None);
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert(PathBuf::from("a"), 1);
        assert_eq!(cache.get(Path::new("a")), Some(1));
        sleep(Duration::from_millis(40));
        assert_eq!(cache.get(Path::new("a")), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_purge_drops_only_expired() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert(PathBuf::from("old"), 1);
        sleep(Duration::from_millis(40));
        cache.insert(PathBuf::from("fresh"), 2);
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Path::new("fresh")), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(PathBuf::from("a"), 1);
        cache.insert(PathBuf::from("b"), 2);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
