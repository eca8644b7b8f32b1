//! In-memory blob store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::blob::{BlobPath, BlobStore};
use crate::domain::{BlobReadErrorKind, DomainError};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Bytes,
    content_type: String,
}

/// Thread-safe in-memory blob store
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for a path, if anything is stored there
    pub fn content_type(&self, path: &BlobPath) -> Option<String> {
        self.blobs
            .read()
            .ok()?
            .get(&path.to_string())
            .map(|blob| blob.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        path: &BlobPath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), DomainError> {
        let mut blobs = self.blobs.write().map_err(|e| {
            DomainError::blob_write(path.to_string(), format!("Failed to acquire write lock: {}", e))
        })?;

        blobs.insert(
            path.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );

        Ok(())
    }

    async fn get(&self, path: &BlobPath, max_bytes: usize) -> Result<Bytes, DomainError> {
        let key = path.to_string();
        let blobs = self.blobs.read().map_err(|e| {
            DomainError::blob_read(
                BlobReadErrorKind::Transport,
                key.as_str(),
                format!("Failed to acquire read lock: {}", e),
            )
        })?;

        let blob = blobs
            .get(&key)
            .ok_or_else(|| DomainError::blob_not_found(key.as_str()))?;

        if blob.bytes.len() > max_bytes {
            return Err(DomainError::blob_too_large(
                key.as_str(),
                blob.bytes.len() as u64,
                max_bytes,
            ));
        }

        Ok(blob.bytes.clone())
    }
}
