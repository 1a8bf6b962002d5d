//! Cache Store Module
//!
//! In-memory tier: HashMap storage with LRU tracking, a byte budget and TTL
//! expiration. Synchronous; the async facade in `artifact` wraps it in a lock
//! and forwards removals to the durable tier.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::{CacheCounters, CacheEntry, CacheStatistics, LruTracker, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of an in-memory read.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Live entry; its access time and hit count are already updated
    Hit(CacheEntry),
    /// Entry was present but past its TTL and has been removed
    Expired,
    /// Nothing under this key
    Missing,
}

// == Cache Store ==
/// Main in-memory storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Lifetime event counters
    counters: CacheCounters,
    /// Sum of `size_bytes` over `entries`
    total_size: u64,
    /// Byte budget
    capacity_bytes: u64,
    /// Maximum entry age
    ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given byte budget and TTL.
    pub fn new(capacity_bytes: u64, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: CacheCounters::new(),
            total_size: 0,
            capacity_bytes,
            ttl,
        }
    }

    // == Validate ==
    /// Rejects keys and sizes the store can never hold.
    pub fn validate(&self, key: &str, size_bytes: u64) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if size_bytes > self.capacity_bytes {
            return Err(CacheError::InvalidRequest(format!(
                "Payload of {} bytes exceeds cache capacity of {} bytes",
                size_bytes, self.capacity_bytes
            )));
        }
        Ok(())
    }

    // == Insert ==
    /// Stores an entry, replacing any entry under the same key.
    ///
    /// When the new entry does not fit, least recently used entries are
    /// evicted until at least `size_bytes` have been freed. Returns the keys
    /// that were evicted.
    pub fn insert(&mut self, entry: CacheEntry) -> Result<Vec<String>> {
        self.validate(&entry.key, entry.size_bytes)?;

        // A replaced entry gives its bytes back before the budget check
        self.remove(&entry.key);

        let mut evicted = Vec::new();
        if self.total_size + entry.size_bytes > self.capacity_bytes {
            let (_, keys) = self.evict(entry.size_bytes);
            evicted = keys;
        }

        self.total_size += entry.size_bytes;
        self.lru.touch(&entry.key, entry.last_accessed_at);
        self.entries.insert(entry.key.clone(), entry);

        Ok(evicted)
    }

    // == Promote ==
    /// Inserts an entry read back from the durable tier and records the read.
    ///
    /// The entry keeps its original `created_at`, so promotion never extends
    /// its lifetime. Returns the updated entry and the evicted keys.
    pub fn promote(
        &mut self,
        mut entry: CacheEntry,
        now: DateTime<Utc>,
    ) -> Result<(CacheEntry, Vec<String>)> {
        entry.size_bytes = entry.payload.len() as u64;
        entry.record_access(now);
        let evicted = self.insert(entry.clone())?;
        self.counters.record_promotion();
        Ok((entry, evicted))
    }

    // == Lookup ==
    /// Reads an entry, dropping it if expired.
    ///
    /// Misses are not counted here because the caller may still find the key
    /// in the durable tier; see [`CacheStore::record_miss`].
    pub fn lookup(&mut self, key: &str, now: DateTime<Utc>) -> Lookup {
        let Some(entry) = self.entries.get_mut(key) else {
            return Lookup::Missing;
        };

        if entry.is_expired(self.ttl, now) {
            self.remove(key);
            self.counters.record_expiration();
            return Lookup::Expired;
        }

        entry.record_access(now);
        self.lru.touch(key, now);
        Lookup::Hit(entry.clone())
    }

    // == Evict ==
    /// Removes least recently used entries until `required_bytes` have been
    /// freed or the store is empty.
    ///
    /// Returns the bytes freed and the evicted keys, oldest first.
    pub fn evict(&mut self, required_bytes: u64) -> (u64, Vec<String>) {
        let mut freed = 0;
        let mut evicted = Vec::new();

        while freed < required_bytes {
            let Some(key) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_size -= entry.size_bytes;
                freed += entry.size_bytes;
                self.counters.record_eviction();
            }
            evicted.push(key);
        }

        (freed, evicted)
    }

    // == Sweep Expired ==
    /// Removes all entries past their TTL.
    ///
    /// Returns the removed keys.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(self.ttl, now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
            self.counters.record_expiration();
        }

        expired
    }

    // == Remove ==
    /// Removes an entry by key, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.total_size -= entry.size_bytes;
        Some(entry)
    }

    // == Clear ==
    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.counters.reset();
        self.total_size = 0;
    }

    pub fn record_miss(&mut self) {
        self.counters.record_miss();
    }

    pub fn record_expiration(&mut self) {
        self.counters.record_expiration();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStatistics {
        let total_hits = self.entries.values().map(|entry| entry.hit_count).sum::<u64>();
        CacheStatistics::new(
            self.entries.len(),
            self.total_size,
            total_hits,
            self.capacity_bytes,
            self.counters.clone(),
        )
    }

    /// Whether a live entry exists, without counting it as an access.
    pub fn contains(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl, now))
    }

    /// Read-only view of an entry, regardless of expiry.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.is_expired(self.ttl, now)
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const TTL: Duration = Duration::from_millis(1000);

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    fn entry(key: &str, size: usize, now: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(key, Bytes::from(vec![b'x'; size]), None, now)
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100, TTL);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
    }

    #[test]
    fn test_store_insert_and_lookup() {
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("doc", 10, at(0))).unwrap();
        match store.lookup("doc", at(5)) {
            Lookup::Hit(hit) => {
                assert_eq!(hit.payload.len(), 10);
                assert_eq!(hit.hit_count, 1);
                assert_eq!(hit.last_accessed_at, at(5));
            }
            other => panic!("expected hit, got {:?}", other),
        }
        assert_eq!(store.total_size(), 10);
    }

    #[test]
    fn test_store_lookup_missing() {
        let mut store = CacheStore::new(100, TTL);
        assert!(matches!(store.lookup("nope", at(0)), Lookup::Missing));
    }

    #[test]
    fn test_store_rejects_invalid_input() {
        let mut store = CacheStore::new(100, TTL);

        let empty_key = store.insert(entry("", 1, at(0)));
        assert!(matches!(empty_key, Err(CacheError::InvalidRequest(_))));

        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        let too_long = store.insert(entry(&long_key, 1, at(0)));
        assert!(matches!(too_long, Err(CacheError::InvalidRequest(_))));

        let too_big = store.insert(entry("big", 101, at(0)));
        assert!(matches!(too_big, Err(CacheError::InvalidRequest(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite_resets_entry() {
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("doc", 10, at(0))).unwrap();
        store.lookup("doc", at(1));
        store.lookup("doc", at(2));

        store.insert(entry("doc", 30, at(3))).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_size(), 30);
        let replaced = store.peek("doc").unwrap();
        assert_eq!(replaced.hit_count, 0);
        assert_eq!(replaced.created_at, at(3));
    }

    #[test]
    fn test_store_lru_eviction_order() {
        // Fits exactly two 40-byte entries
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("a", 40, at(0))).unwrap();
        store.insert(entry("b", 40, at(0))).unwrap();
        store.lookup("a", at(1));
        store.lookup("b", at(2));

        let evicted = store.insert(entry("d", 40, at(3))).unwrap();

        assert_eq!(evicted, vec!["a".to_string()]);
        assert!(store.peek("a").is_none());
        assert!(store.peek("b").is_some());
        assert!(store.total_size() <= 100);
        assert_eq!(store.stats().counters.evictions, 1);
    }

    #[test]
    fn test_store_evict_frees_requested_bytes() {
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("a", 20, at(0))).unwrap();
        store.insert(entry("b", 20, at(1))).unwrap();
        store.insert(entry("c", 20, at(2))).unwrap();

        let (freed, keys) = store.evict(30);
        assert_eq!(freed, 40);
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.total_size(), 20);
    }

    #[test]
    fn test_store_evict_empties_when_short() {
        let mut store = CacheStore::new(100, TTL);
        store.insert(entry("a", 20, at(0))).unwrap();

        let (freed, keys) = store.evict(500);
        assert_eq!(freed, 20);
        assert_eq!(keys.len(), 1);
        assert!(store.is_empty());

        let (freed, keys) = store.evict(10);
        assert_eq!(freed, 0);
        assert!(keys.is_empty());
    }

    #[test]
    fn test_store_lookup_expired() {
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("doc", 10, at(0))).unwrap();

        assert!(matches!(store.lookup("doc", at(1001)), Lookup::Expired));
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.stats().counters.expirations, 1);
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = CacheStore::new(100, TTL);

        store.insert(entry("old", 10, at(0))).unwrap();
        store.insert(entry("new", 10, at(800))).unwrap();

        let removed = store.sweep_expired(at(1500));
        assert_eq!(removed, vec!["old".to_string()]);
        assert_eq!(store.len(), 1);
        assert!(store.contains("new", at(1500)));
    }

    #[test]
    fn test_store_promote_keeps_created_at() {
        let mut store = CacheStore::new(100, TTL);
        let stored = entry("doc", 10, at(0));

        let (promoted, evicted) = store.promote(stored, at(400)).unwrap();

        assert!(evicted.is_empty());
        assert_eq!(promoted.created_at, at(0));
        assert_eq!(promoted.hit_count, 1);
        assert_eq!(store.stats().counters.promotions, 1);
        assert!(matches!(store.lookup("doc", at(1200)), Lookup::Expired));
    }

    #[test]
    fn test_store_clear_resets_everything() {
        let mut store = CacheStore::new(100, TTL);
        store.insert(entry("a", 60, at(0))).unwrap();
        store.insert(entry("b", 60, at(1))).unwrap();
        store.record_miss();

        store.clear();
        store.clear();

        let stats = store.stats();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.counters, CacheCounters::default());
    }

    #[test]
    fn test_store_stats_aggregate_hits() {
        let mut store = CacheStore::new(100, TTL);
        store.insert(entry("a", 10, at(0))).unwrap();
        store.insert(entry("b", 30, at(0))).unwrap();

        for ms in 1..=3 {
            store.lookup("a", at(ms));
        }
        store.lookup("b", at(4));

        let stats = store.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_size, 40);
        assert_eq!(stats.total_hits, 4);
        assert_eq!(stats.hit_rate, 2.0);
        assert_eq!(stats.utilization, 0.4);
    }

    #[test]
    fn test_store_contains_does_not_touch() {
        let mut store = CacheStore::new(100, TTL);
        store.insert(entry("a", 10, at(0))).unwrap();

        assert!(store.contains("a", at(10)));
        assert!(!store.contains("a", at(2000)));
        assert_eq!(store.peek("a").unwrap().hit_count, 0);
    }
}
