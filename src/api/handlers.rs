//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::cache::{ArtifactCache, CacheEntry};
use crate::config::Config;
use crate::durable::{DurableTier, FileTier, MemoryTier};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, DocumentHeaders, HealthResponse, MaintenanceResponse, PrefetchResponse,
    PutDocumentQuery, PutResponse, StatsResponse,
};
use crate::source::DocumentSource;

pub const DOCUMENT_ID_HEADER: &str = "x-document-id";
pub const DOCUMENT_VERSION_HEADER: &str = "x-document-version";
pub const CACHE_HITS_HEADER: &str = "x-cache-hits";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The artifact cache
    pub cache: Arc<ArtifactCache>,
    /// Upstream used for fetch-through and prefetch, if configured
    pub source: Option<Arc<DocumentSource>>,
    /// Token required on mutating routes, if configured
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    /// Creates a new AppState around the given cache, without upstream or token.
    pub fn new(cache: ArtifactCache) -> Self {
        Self {
            cache: Arc::new(cache),
            source: None,
            api_token: None,
        }
    }

    pub fn with_source(mut self, source: DocumentSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Arc::from(token.into()));
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses a [`FileTier`] when `durable_dir` is set, an in-process tier otherwise.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let durable: Arc<dyn DurableTier> = match &config.durable_dir {
            Some(dir) => {
                let tier = FileTier::new(dir);
                tier.init().await?;
                Arc::new(tier)
            }
            None => Arc::new(MemoryTier::new()),
        };

        let mut state = Self::new(ArtifactCache::new(config.cache_config(), durable));
        if let Some(url) = &config.document_source_url {
            let timeout = std::time::Duration::from_secs(config.fetch_timeout);
            state = state.with_source(DocumentSource::new(url, timeout)?);
            info!(url = %url, "Document source configured");
        }
        if let Some(token) = &config.api_token {
            state = state.with_api_token(token.clone());
        }
        Ok(state)
    }

    /// Token presence check for mutating routes.
    fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = self.api_token.as_deref() else {
            return Ok(());
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match provided {
            Some(token) if token == expected => Ok(()),
            Some(_) => Err(CacheError::Unauthorized("Invalid API token".to_string())),
            None => Err(CacheError::Unauthorized("Missing API token".to_string())),
        }
    }
}

fn document_response(entry: &CacheEntry) -> Response {
    let meta = DocumentHeaders::from(entry);
    (
        [
            ("content-type", "application/pdf".to_string()),
            (DOCUMENT_ID_HEADER, meta.document_id),
            (DOCUMENT_VERSION_HEADER, meta.version.to_string()),
            (CACHE_HITS_HEADER, meta.hit_count.to_string()),
        ],
        entry.payload.clone(),
    )
        .into_response()
}

/// Handler for GET /documents/:key
///
/// Serves the cached document. With a document source configured, a miss
/// is fetched upstream and cached on the way through.
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let entry = match &state.source {
        Some(source) => source.fetch_through(&state.cache, &key).await?,
        None => state
            .cache
            .get_entry(&key)
            .await
            .ok_or_else(|| CacheError::NotFound(key.clone()))?,
    };

    Ok(document_response(&entry))
}

/// Handler for PUT /documents/:key
///
/// Stores the raw request body under `key`.
pub async fn put_document_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Query(query): Query<PutDocumentQuery>,
    body: Bytes,
) -> Result<Json<PutResponse>> {
    state.authorize(&headers)?;

    if let Some(error_msg) = query.validate(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let size_bytes = body.len() as u64;
    let metadata = query.into_metadata(&key);
    let version = metadata.version;

    if !state.cache.put(&key, body, Some(metadata)).await {
        return Err(CacheError::InvalidRequest(format!(
            "Document '{}' of {} bytes could not be cached",
            key, size_bytes
        )));
    }

    Ok(Json(PutResponse::new(key, size_bytes, version)))
}

/// Handler for POST /documents/:key/prefetch
///
/// Schedules a background fetch; the response does not wait for it.
pub async fn prefetch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<PrefetchResponse>)> {
    state.authorize(&headers)?;

    let source = state
        .source
        .clone()
        .ok_or_else(|| CacheError::Unavailable("No document source configured".to_string()))?;
    let url = source.document_url(&key).to_string();

    let cache = state.cache.clone();
    let task_key = key.clone();
    tokio::spawn(async move {
        source.prefetch(&cache, &task_key).await;
    });

    Ok((StatusCode::ACCEPTED, Json(PrefetchResponse::new(key, url))))
}

/// Handler for DELETE /documents/:key
pub async fn delete_document_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.authorize(&headers)?;

    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /cache
pub async fn clear_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MaintenanceResponse>> {
    state.authorize(&headers)?;
    state.cache.clear().await;
    Ok(Json(MaintenanceResponse::cleared()))
}

/// Handler for POST /cache/sweep
pub async fn sweep_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MaintenanceResponse>> {
    state.authorize(&headers)?;
    let removed = state.cache.sweep_expired().await;
    Ok(Json(MaintenanceResponse::swept(removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(ArtifactCache::in_memory(CacheConfig::new(
            1024,
            Duration::from_secs(300),
        )))
    }

    async fn put(state: &AppState, key: &str, body: &[u8]) -> Result<Json<PutResponse>> {
        put_document_handler(
            State(state.clone()),
            HeaderMap::new(),
            Path(key.to_string()),
            Query(PutDocumentQuery::default()),
            Bytes::copy_from_slice(body),
        )
        .await
    }

    #[tokio::test]
    async fn test_put_and_get_document() {
        let state = state();

        let response = put(&state, "C-1", b"%PDF-1.7").await.unwrap();
        assert_eq!(response.size_bytes, 8);
        assert_eq!(response.version, 1);

        let response = get_document_handler(State(state), Path("C-1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(response.headers()["x-cache-hits"], "1");
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let result = get_document_handler(State(state()), Path("nope".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_too_large_is_rejected() {
        let state = state();
        let result = put(&state, "big", &[0u8; 2048]).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let state = state();
        let _response = put(&state, "C-2", b"pdf").await.unwrap();

        let result =
            delete_document_handler(State(state.clone()), HeaderMap::new(), Path("C-2".into()))
                .await;
        assert!(result.is_ok());

        let result =
            delete_document_handler(State(state), HeaderMap::new(), Path("C-2".into())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prefetch_without_source() {
        let result =
            prefetch_handler(State(state()), HeaderMap::new(), Path("C-3".to_string())).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let state = state();
        let _response = put(&state, "a", b"1234").await.unwrap();

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.stats.total_entries, 1);
        assert_eq!(stats.formatted_size, "4 B");

        let response = clear_handler(State(state.clone()), HeaderMap::new())
            .await
            .unwrap();
        assert!(response.removed.is_none());
        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_sweep_handler() {
        let response = sweep_handler(State(state()), HeaderMap::new()).await.unwrap();
        assert_eq!(response.removed, Some(0));
    }

    #[tokio::test]
    async fn test_token_check() {
        let state = state().with_api_token("secret");

        let result = clear_handler(State(state.clone()), HeaderMap::new()).await;
        assert!(matches!(result, Err(CacheError::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
        let result = clear_handler(State(state.clone()), headers).await;
        assert!(matches!(result, Err(CacheError::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
        assert!(clear_handler(State(state), headers).await.is_ok());
    }

    #[tokio::test]
    async fn test_from_config_with_durable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            durable_dir: Some(dir.path().join("artifacts")),
            api_token: Some("t".to_string()),
            ..Config::default()
        };

        let state = AppState::from_config(&config).await.unwrap();
        assert!(state.source.is_none());
        assert!(state.api_token.is_some());
        assert!(dir.path().join("artifacts").is_dir());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
