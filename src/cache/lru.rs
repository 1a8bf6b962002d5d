//! LRU Tracker Module
//!
//! Orders cached keys by last access time for eviction.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

/// Position of a key in the recency order: access time, then access sequence.
type Rank = (DateTime<Utc>, u64);

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are ranked by their last access time. Equal timestamps fall back to
/// the order in which the accesses were recorded, so eviction order is
/// deterministic even when the clock does not advance between calls.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Rank -> key, oldest first
    order: BTreeMap<Rank, String>,
    /// Key -> current rank
    ranks: HashMap<String, Rank>,
    /// Monotonic access counter
    sequence: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Records an access to `key` at `at`, moving it to the recent end.
    pub fn touch(&mut self, key: &str, at: DateTime<Utc>) {
        self.remove(key);
        self.sequence += 1;
        let rank = (at, self.sequence);
        self.order.insert(rank, key.to_string());
        self.ranks.insert(key.to_string(), rank);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.values().next()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }

    // == Clear ==
    /// Forgets every key. The access sequence keeps counting.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ranks.clear();
    }
}
