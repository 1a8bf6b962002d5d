//! Artifact Cache Module
//!
//! Async two-tier cache. The in-memory [`CacheStore`] is authoritative and
//! guarded by a lock that is never held across durable-tier I/O; the durable
//! tier is written through and read on in-memory misses.
//!
//! No operation here returns an error. Failures are logged and degrade to a
//! miss, a `false`, or a no-op, so callers can always fall back to fetching
//! the document themselves.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStatistics, CacheStore, EntryMetadata, Lookup};
use crate::config::CacheConfig;
use crate::durable::{DurableTier, MemoryTier};
use crate::error::Result;

// == Artifact Cache ==
/// Capacity-bounded, TTL-expiring cache for document artifacts.
pub struct ArtifactCache {
    /// In-memory tier
    store: RwLock<CacheStore>,
    /// Best-effort persistent tier
    durable: Arc<dyn DurableTier>,
    config: CacheConfig,
}

impl ArtifactCache {
    // == Constructor ==
    /// Creates a cache over the given durable tier.
    pub fn new(config: CacheConfig, durable: Arc<dyn DurableTier>) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(config.capacity_bytes, config.ttl)),
            durable,
            config,
        }
    }

    /// Creates a cache whose durable tier is a process-local [`MemoryTier`].
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(MemoryTier::new()))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Put ==
    /// Stores `payload` under `key`, evicting least recently used entries
    /// when the budget would be exceeded.
    ///
    /// Returns `false` if the entry was rejected (empty or over-long key,
    /// payload larger than the whole capacity). Durable-tier failures do not
    /// affect the result.
    pub async fn put(
        &self,
        key: &str,
        payload: impl Into<Bytes>,
        metadata: Option<EntryMetadata>,
    ) -> bool {
        match self.try_put(key, payload.into(), metadata).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache put rejected");
                false
            }
        }
    }

    async fn try_put(
        &self,
        key: &str,
        payload: Bytes,
        metadata: Option<EntryMetadata>,
    ) -> Result<()> {
        let entry = CacheEntry::new(key, payload, metadata, Utc::now());
        let evicted = self.store.write().await.insert(entry.clone())?;

        debug!(
            key = %key,
            size_bytes = entry.size_bytes,
            evicted = evicted.len(),
            "Cached artifact"
        );

        self.forget_durable(&evicted).await;
        match self.durable.put(&entry).await {
            Ok(()) => self.reconcile_durable(&entry).await,
            Err(e) => warn!(key = %key, error = %e, "Failed to mirror entry to durable tier"),
        }
        Ok(())
    }

    /// Re-checks memory after a durable write that ran without the lock.
    ///
    /// A concurrent put may have evicted or replaced the entry while it was
    /// being written; the durable copy must then follow what memory holds.
    async fn reconcile_durable(&self, written: &CacheEntry) {
        let live = self.store.read().await.peek(&written.key).cloned();

        match live {
            Some(entry) if entry.created_at == written.created_at => {}
            Some(entry) => {
                debug!(key = %written.key, "Entry replaced during durable write");
                if let Err(e) = self.durable.put(&entry).await {
                    warn!(key = %written.key, error = %e, "Failed to mirror entry to durable tier");
                }
            }
            None => {
                debug!(key = %written.key, "Entry evicted during durable write");
                self.forget_durable(&[written.key.clone()]).await;
            }
        }
    }

    // == Get ==
    /// Returns the payload for `key` if a live entry exists in either tier.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.get_entry(key).await.map(|entry| entry.payload)
    }

    /// Like [`get`](Self::get), returning the whole entry with its metadata.
    ///
    /// Durable-tier hits are promoted into memory. Expired entries are
    /// removed from both tiers and reported as absent.
    pub async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        if key.is_empty() {
            return None;
        }

        let now = Utc::now();
        let lookup = self.store.write().await.lookup(key, now);
        match lookup {
            Lookup::Hit(entry) => {
                debug!(key = %key, hit_count = entry.hit_count, "Memory tier hit");
                return Some(entry);
            }
            Lookup::Expired => {
                debug!(key = %key, "Entry expired on read");
                self.store.write().await.record_miss();
                self.forget_durable(&[key.to_string()]).await;
                return None;
            }
            Lookup::Missing => {}
        }

        match self.durable.get(key).await {
            Ok(Some(entry)) => self.promote(key, entry, now).await,
            Ok(None) => {
                self.store.write().await.record_miss();
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Durable tier read failed");
                self.store.write().await.record_miss();
                None
            }
        }
    }

    async fn promote(
        &self,
        key: &str,
        mut entry: CacheEntry,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry> {
        entry.key = key.to_string();

        let promoted = {
            let mut store = self.store.write().await;
            if store.is_expired(&entry, now) {
                store.record_expiration();
                store.record_miss();
                None
            } else {
                Some(store.promote(entry, now))
            }
        };

        match promoted {
            None => {
                debug!(key = %key, "Durable entry expired");
                self.forget_durable(&[key.to_string()]).await;
                None
            }
            Some(Ok((entry, evicted))) => {
                debug!(key = %key, evicted = evicted.len(), "Promoted durable entry");
                self.forget_durable(&evicted).await;
                Some(entry)
            }
            Some(Err(e)) => {
                warn!(key = %key, error = %e, "Failed to promote durable entry");
                self.store.write().await.record_miss();
                None
            }
        }
    }

    // == Evict ==
    /// Frees at least `required_bytes` by removing least recently used
    /// entries, or empties the cache trying. Returns the bytes freed.
    pub async fn evict(&self, required_bytes: u64) -> u64 {
        let (freed, evicted) = self.store.write().await.evict(required_bytes);
        if !evicted.is_empty() {
            info!(freed, evicted = evicted.len(), "Evicted cache entries");
        }
        self.forget_durable(&evicted).await;
        freed
    }

    // == Sweep Expired ==
    /// Removes every expired in-memory entry from both tiers.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        let expired = self.store.write().await.sweep_expired(Utc::now());
        self.forget_durable(&expired).await;
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStatistics {
        self.store.read().await.stats()
    }

    // == Clear ==
    /// Empties both tiers and resets the counters. Idempotent.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        if let Err(e) = self.durable.clear().await {
            warn!(error = %e, "Failed to clear durable tier");
        }
        info!("Cache cleared");
    }

    // == Delete ==
    /// Removes `key` from both tiers. Returns whether it was held in memory.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = self.store.write().await.remove(key).is_some();
        self.forget_durable(&[key.to_string()]).await;
        removed
    }

    /// In-memory entry under `key`, without counting an access.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.store.read().await.peek(key).cloned()
    }

    /// Whether a live in-memory entry exists, without counting an access.
    pub async fn contains(&self, key: &str) -> bool {
        self.store.read().await.contains(key, Utc::now())
    }

    async fn forget_durable(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.durable.delete(key).await {
                warn!(key = %key, error = %e, "Failed to delete entry from durable tier");
            }
        }
    }
}
