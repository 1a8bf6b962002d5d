//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::{CacheEntry, CacheStatistics};

/// Response body for storing a document (PUT /documents/:key)
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    pub message: String,
    pub key: String,
    pub size_bytes: u64,
    pub version: u32,
}

impl PutResponse {
    pub fn new(entry_key: impl Into<String>, size_bytes: u64, version: u32) -> Self {
        let key = entry_key.into();
        Self {
            message: format!("Document '{}' cached", key),
            key,
            size_bytes,
            version,
        }
    }
}

/// Response body for DELETE /documents/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Document '{}' removed from cache", key),
            key,
        }
    }
}

/// Response body for POST /documents/:key/prefetch
#[derive(Debug, Clone, Serialize)]
pub struct PrefetchResponse {
    pub message: String,
    pub key: String,
    pub url: String,
}

impl PrefetchResponse {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Prefetch of '{}' scheduled", key),
            key,
            url: url.into(),
        }
    }
}

/// Response body for cache maintenance routes (DELETE /cache, POST /cache/sweep)
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub message: String,
    /// Entries removed by the operation, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
}

impl MaintenanceResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
            removed: None,
        }
    }

    pub fn swept(removed: usize) -> Self {
        Self {
            message: format!("Removed {} expired entries", removed),
            removed: Some(removed),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
///
/// Carries the raw statistics plus display-ready fields for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStatistics,
    /// Aggregate size, e.g. "1.5 MB"
    pub formatted_size: String,
    /// Utilization in percent, one decimal
    pub utilization_percent: f64,
}

impl From<CacheStatistics> for StatsResponse {
    fn from(stats: CacheStatistics) -> Self {
        Self {
            formatted_size: stats.formatted_size(),
            utilization_percent: stats.utilization_percent(),
            stats,
        }
    }
}

/// Metadata echo for a served document, used for response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeaders {
    pub document_id: String,
    pub version: u32,
    pub hit_count: u64,
}

impl From<&CacheEntry> for DocumentHeaders {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            document_id: entry.metadata.document_id.clone(),
            version: entry.metadata.version,
            hit_count: entry.hit_count,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
