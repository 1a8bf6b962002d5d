//! Directory-backed durable tier.
//!
//! Each key maps to two files named by the SHA-256 of the key: `<hash>.bin`
//! holds the payload and `<hash>.json` the entry header. The header is
//! written last, so a header without a readable payload is treated as corrupt.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

use super::DurableTier;
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

const PAYLOAD_EXT: &str = "bin";
const HEADER_EXT: &str = "json";

/// Durable tier storing entries as files in a directory.
#[derive(Debug, Clone)]
pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensures the directory exists.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        info!(dir = ?self.dir, "Durable tier initialized");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a key: hex SHA-256, safe for any key content.
    pub fn file_stem(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path_for(&self, key: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", Self::file_stem(key), ext))
    }
}

/// Whether `path` is a payload or header written by [`FileTier`]:
/// a 64-character hex stem with one of the two extensions.
fn is_tier_file(path: &Path) -> bool {
    let ext_ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == PAYLOAD_EXT || ext == HEADER_EXT);
    let stem_ok = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.len() == 64 && stem.bytes().all(|b| b.is_ascii_hexdigit()));
    ext_ok && stem_ok
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl DurableTier for FileTier {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let header = match fs::read(self.path_for(key, HEADER_EXT)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut entry: CacheEntry = serde_json::from_slice(&header)?;

        let payload = match fs::read(self.path_for(key, PAYLOAD_EXT)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(key = %key, "Durable header has no payload, dropping it");
                self.delete(key).await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if entry.key != key || payload.len() as u64 != entry.size_bytes {
            self.delete(key).await?;
            return Err(CacheError::Internal(format!(
                "Durable entry for '{}' is corrupt",
                key
            )));
        }

        entry.payload = Bytes::from(payload);
        debug!(key = %key, size_bytes = entry.size_bytes, "Durable tier hit");
        Ok(Some(entry))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let header = serde_json::to_vec(entry)?;
        fs::write(self.path_for(&entry.key, PAYLOAD_EXT), &entry.payload).await?;
        fs::write(self.path_for(&entry.key, HEADER_EXT), header).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        remove_if_present(&self.path_for(key, HEADER_EXT)).await?;
        remove_if_present(&self.path_for(key, PAYLOAD_EXT)).await
    }

    async fn clear(&self) -> Result<()> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if is_tier_file(&path) {
                remove_if_present(&path).await?;
            }
        }
        Ok(())
    }
}
