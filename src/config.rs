//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY_BYTES, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TTL_MS};

/// Shortest sweep period accepted from the environment.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Tuning knobs for a single [`ArtifactCache`](crate::cache::ArtifactCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Byte budget for the in-memory tier
    pub capacity_bytes: u64,
    /// Maximum age of an entry, measured from its creation
    pub ttl: Duration,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given capacity and TTL and the default sweep period.
    pub fn new(capacity_bytes: u64, ttl: Duration) -> Self {
        Self {
            capacity_bytes,
            ttl,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES, Duration::from_millis(DEFAULT_TTL_MS))
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// In-memory tier budget in bytes
    pub capacity_bytes: u64,
    /// Entry time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the document source; prefetch is disabled when unset
    pub document_source_url: Option<String>,
    /// Directory for the durable tier; an in-process tier is used when unset
    pub durable_dir: Option<PathBuf>,
    /// Timeout applied to document source fetches, in seconds
    pub fetch_timeout: u64,
    /// Token required on mutating routes when set
    pub api_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY_BYTES` - In-memory budget (default: 50 MiB)
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 30 minutes)
    /// - `SWEEP_INTERVAL_SECS` - Expiry sweep frequency (default: 600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DOCUMENT_SOURCE_URL` - Upstream document base URL (optional)
    /// - `DURABLE_DIR` - Durable tier directory (optional)
    /// - `FETCH_TIMEOUT_SECS` - Upstream fetch timeout (default: 30)
    /// - `API_TOKEN` - Bearer token for mutating routes (optional)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity_bytes: parse_var("CACHE_CAPACITY_BYTES").unwrap_or(defaults.capacity_bytes),
            ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.ttl_ms),
            sweep_interval: parse_var("SWEEP_INTERVAL_SECS").unwrap_or(defaults.sweep_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            document_source_url: non_empty_var("DOCUMENT_SOURCE_URL"),
            durable_dir: non_empty_var("DURABLE_DIR").map(PathBuf::from),
            fetch_timeout: parse_var("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout),
            api_token: non_empty_var("API_TOKEN"),
        }
    }

    /// Cache tuning derived from this configuration.
    ///
    /// The sweep interval is raised to at least one second.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity_bytes: self.capacity_bytes,
            ttl: Duration::from_millis(self.ttl_ms),
            sweep_interval: Duration::from_secs(self.sweep_interval).max(MIN_SWEEP_INTERVAL),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            ttl_ms: DEFAULT_TTL_MS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            server_port: 3000,
            document_source_url: None,
            durable_dir: None,
            fetch_timeout: 30,
            api_token: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
