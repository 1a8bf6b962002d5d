//! In-process durable tier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DurableTier;
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Durable tier held in a process-local map.
///
/// Can be switched offline to simulate an unavailable store.
#[derive(Debug)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
    available: AtomicBool,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles availability; while offline every operation fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("durable tier is offline".to_string()))
        }
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableTier for MemoryTier {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.ensure_available()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.ensure_available()?;
        self.entries
            .write()
            .await
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_available()?;
        self.entries.write().await.clear();
        Ok(())
    }
}
