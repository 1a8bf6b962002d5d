//! Document Source
//!
//! HTTP client for the upstream that serves document artifacts, plus the
//! helpers that feed its responses into the cache.

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::cache::{ArtifactCache, CacheEntry, EntryMetadata};
use crate::error::{CacheError, Result};

/// Fetches documents from `<base_url>/<key>`.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    client: Client,
    base_url: Url,
}

impl DocumentSource {
    /// Creates a source for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheError::InvalidRequest(format!("Invalid document source URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::InvalidRequest(format!(
                "Document source URL cannot be a base: {}",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// URL of the document for `key`; the key is a single escaped path segment.
    pub fn document_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key);
        }
        url
    }

    // == Fetch ==
    /// Downloads the document for `key`.
    ///
    /// An upstream 404 is reported as [`CacheError::NotFound`]; other
    /// non-success statuses are upstream errors.
    pub async fn fetch(&self, key: &str) -> Result<Bytes> {
        let url = self.document_url(key);
        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CacheError::NotFound(key.to_string()));
        }
        let payload = response.error_for_status()?.bytes().await?;

        debug!(key = %key, url = %url, size_bytes = payload.len(), "Fetched document");
        Ok(payload)
    }

    // == Prefetch ==
    /// Fetches `key` and stores it in `cache`. Failures are logged and dropped.
    ///
    /// Returns whether the document ended up cached.
    pub async fn prefetch(&self, cache: &ArtifactCache, key: &str) -> bool {
        match self.fetch(key).await {
            Ok(payload) => cache.put(key, payload, Some(self.metadata_for(key))).await,
            Err(e) => {
                warn!(key = %key, error = %e, "Prefetch failed");
                false
            }
        }
    }

    // == Fetch Through ==
    /// Serves `key` from the cache, fetching and caching it on a miss.
    pub async fn fetch_through(&self, cache: &ArtifactCache, key: &str) -> Result<CacheEntry> {
        if let Some(entry) = cache.get_entry(key).await {
            return Ok(entry);
        }

        let payload = self.fetch(key).await?;
        let metadata = self.metadata_for(key);
        if !cache.put(key, payload.clone(), Some(metadata.clone())).await {
            debug!(key = %key, "Fetched document was not cached");
        }
        Ok(CacheEntry::new(key, payload, Some(metadata), Utc::now()))
    }

    fn metadata_for(&self, key: &str) -> EntryMetadata {
        EntryMetadata::for_document(key).with_source(self.document_url(key).to_string())
    }
}
