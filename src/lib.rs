//! Artifact Cache - two-tier document cache service
//!
//! Keeps recently fetched document artifacts (contract and quote PDFs) in a
//! byte-bounded in-memory tier with TTL expiration and LRU eviction, mirrored
//! into a best-effort durable tier.

pub mod api;
pub mod cache;
pub mod config;
pub mod durable;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use cache::ArtifactCache;
pub use config::{CacheConfig, Config};
pub use source::DocumentSource;
pub use tasks::spawn_sweep_task;
