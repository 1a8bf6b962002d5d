//! API Module
//!
//! HTTP handlers and routing for the artifact cache service.
//!
//! # Endpoints
//! - `GET /documents/:key` - Serve a document, fetching it upstream on a miss
//! - `PUT /documents/:key` - Store a document body
//! - `POST /documents/:key/prefetch` - Warm the cache in the background
//! - `DELETE /documents/:key` - Remove a document
//! - `DELETE /cache` - Clear both tiers
//! - `POST /cache/sweep` - Remove expired entries now
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
