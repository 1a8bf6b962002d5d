//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_document_handler, get_document_handler, health_handler,
    prefetch_handler, put_document_handler, stats_handler, sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Body limit: request bodies up to the cache capacity are accepted
/// - CORS: Allows any origin (dashboards are served from elsewhere)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(state.cache.config().capacity_bytes).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/documents/:key",
            get(get_document_handler)
                .put(put_document_handler)
                .delete(delete_document_handler),
        )
        .route("/documents/:key/prefetch", post(prefetch_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/sweep", post(sweep_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
