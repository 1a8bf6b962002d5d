//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is alive.
//!
//! # Tasks
//! - Expiry sweep: removes expired artifacts from both cache tiers

mod sweep;

pub use sweep::spawn_sweep_task;
