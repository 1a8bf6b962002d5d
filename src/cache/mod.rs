//! Cache Module
//!
//! Two-tier document artifact cache: a byte-bounded in-memory tier with TTL
//! expiration and LRU eviction, mirrored into a best-effort durable tier.

mod artifact;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use artifact::ArtifactCache;
pub use entry::{CacheEntry, EntryMetadata};
pub use lru::LruTracker;
pub use stats::{format_bytes, CacheCounters, CacheStatistics};
pub use store::{CacheStore, Lookup};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default in-memory budget
pub const DEFAULT_CAPACITY_BYTES: u64 = 50 * 1024 * 1024; // 50 MiB

/// Default entry time-to-live in milliseconds
pub const DEFAULT_TTL_MS: u64 = 30 * 60 * 1000; // 30 minutes

/// Default expiry sweep period in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10 * 60;
