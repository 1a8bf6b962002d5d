//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ArtifactCache;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The first sweep runs one full interval after spawning. The task never
/// finishes on its own; abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ArtifactCache::in_memory(CacheConfig::default()));
/// let sweep_handle = spawn_sweep_task(cache.clone(), cache.config().sweep_interval);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<ArtifactCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            "Starting expiry sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_expired().await;
            if removed > 0 {
                info!(removed, "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}
