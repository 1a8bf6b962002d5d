//! Cache Entry Module
//!
//! Defines a cached document artifact and its caller-supplied metadata.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_version() -> u32 {
    1
}

// == Entry Metadata ==
/// Descriptive fields attached to an entry.
///
/// Always carries a logical document id and a version; anything else the
/// caller supplies lands in `extra` and is flattened when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Logical document identifier (defaults to the cache key)
    pub document_id: String,
    /// Document version, 1 unless stated otherwise
    #[serde(default = "default_version")]
    pub version: u32,
    /// Where the payload came from, e.g. an upstream URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Arbitrary caller-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntryMetadata {
    /// Metadata for `document_id` at version 1.
    pub fn for_document(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            version: default_version(),
            source: None,
            extra: Map::new(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

// == Cache Entry ==
/// A single cached artifact with access bookkeeping.
///
/// The payload is not part of the serialized form; durable tiers store it
/// next to the serialized header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key (contract or document number)
    pub key: String,
    /// Document content
    #[serde(skip)]
    pub payload: Bytes,
    /// Payload length, fixed at insertion
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// Successful reads since the entry was created
    pub hit_count: u64,
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry stamped at `now`.
    ///
    /// Missing metadata defaults to the key as document id, version 1.
    pub fn new(
        key: impl Into<String>,
        payload: Bytes,
        metadata: Option<EntryMetadata>,
        now: DateTime<Utc>,
    ) -> Self {
        let key = key.into();
        let metadata = metadata.unwrap_or_else(|| EntryMetadata::for_document(key.clone()));

        Self {
            size_bytes: payload.len() as u64,
            key,
            payload,
            created_at: now,
            last_accessed_at: now,
            hit_count: 0,
            metadata,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl` at `now`.
    ///
    /// Age is measured from `created_at`; an entry exactly `ttl` old is
    /// still live.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.created_at > ttl,
            // TTL too large to represent never elapses
            Err(_) => false,
        }
    }

    // == Time To Live ==
    /// Remaining lifetime at `now`, zero once expired.
    pub fn ttl_remaining(&self, ttl: Duration, now: DateTime<Utc>) -> Duration {
        let age = (now - self.created_at).to_std().unwrap_or(Duration::ZERO);
        ttl.saturating_sub(age)
    }

    // == Record Access ==
    /// Marks a successful read at `now`.
    pub fn record_access(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = now;
        self.hit_count += 1;
    }
}
