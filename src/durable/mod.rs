//! Durable Tier Module
//!
//! Key-addressed store backing the in-memory cache. It is an accelerant, not
//! a source of truth: callers log and ignore its errors.
//!
//! # Implementations
//! - [`MemoryTier`] - process-local map, used in tests and when no directory is configured
//! - [`FileTier`] - one payload file plus one JSON header per key in a directory

mod file;
mod memory;

use async_trait::async_trait;

use crate::cache::CacheEntry;
use crate::error::Result;

pub use file::FileTier;
pub use memory::MemoryTier;

/// Persistent store consulted after an in-memory miss.
///
/// The cache only ever addresses it by key; it never iterates it.
#[async_trait]
pub trait DurableTier: Send + Sync {
    /// Returns the stored entry, payload included, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Stores or replaces the entry under `entry.key`.
    async fn put(&self, entry: &CacheEntry) -> Result<()>;

    /// Removes the entry. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;
}
