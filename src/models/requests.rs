//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

use crate::cache::{EntryMetadata, MAX_KEY_LENGTH};

/// Query parameters for storing a document (PUT /documents/:key)
///
/// The raw request body is the document payload.
///
/// # Fields
/// - `document_id`: Logical document id (defaults to the key)
/// - `version`: Document version (defaults to 1)
/// - `source`: Free-form origin tag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PutDocumentQuery {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
}

impl PutDocumentQuery {
    /// Validates the request against the target key
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.version == Some(0) {
            return Some("Version must be at least 1".to_string());
        }
        None
    }

    /// Builds entry metadata for `key`.
    pub fn into_metadata(self, key: &str) -> EntryMetadata {
        let mut metadata =
            EntryMetadata::for_document(self.document_id.unwrap_or_else(|| key.to_string()));
        if let Some(version) = self.version {
            metadata = metadata.with_version(version);
        }
        if let Some(source) = self.source {
            metadata = metadata.with_source(source);
        }
        metadata
    }
}
