//! Cache Statistics Module
//!
//! Lifetime counters plus the derived statistics snapshot shown on dashboards.

use serde::Serialize;

// == Cache Counters ==
/// Lifetime event counters. Reset by `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Reads that found nothing live in either tier
    pub misses: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries dropped for exceeding the TTL
    pub expirations: u64,
    /// Durable-tier hits copied back into memory
    pub promotions: u64,
}

impl CacheCounters {
    /// Creates counters with every value at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Cache Statistics ==
/// Point-in-time view of the in-memory tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    /// Live in-memory entries
    pub total_entries: usize,
    /// Sum of entry sizes in bytes
    pub total_size: u64,
    /// Sum of hit counts over live entries
    pub total_hits: u64,
    /// Hits per live entry
    pub hit_rate: f64,
    /// total_size / capacity
    pub utilization: f64,
    pub capacity_bytes: u64,
    #[serde(flatten)]
    pub counters: CacheCounters,
}

impl CacheStatistics {
    /// Derives the snapshot from raw aggregates.
    pub fn new(
        total_entries: usize,
        total_size: u64,
        total_hits: u64,
        capacity_bytes: u64,
        counters: CacheCounters,
    ) -> Self {
        let hit_rate = if total_entries == 0 {
            0.0
        } else {
            total_hits as f64 / total_entries as f64
        };
        let utilization = if capacity_bytes == 0 {
            0.0
        } else {
            total_size as f64 / capacity_bytes as f64
        };

        Self {
            total_entries,
            total_size,
            total_hits,
            hit_rate,
            utilization,
            capacity_bytes,
            counters,
        }
    }

    /// Aggregate size for display, e.g. `1.5 MB`.
    pub fn formatted_size(&self) -> String {
        format_bytes(self.total_size)
    }

    /// Utilization as a percentage rounded to one decimal.
    pub fn utilization_percent(&self) -> f64 {
        (self.utilization * 1000.0).round() / 10.0
    }
}

/// Human readable byte count using binary multiples.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
