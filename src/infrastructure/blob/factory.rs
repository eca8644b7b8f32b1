//! Blob store factory for runtime backend selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::blob::BlobStore;

use super::filesystem::FilesystemBlobStore;
use super::in_memory::InMemoryBlobStore;

/// Supported blob store backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobStoreType {
    InMemory,
    Filesystem,
}

impl BlobStoreType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "filesystem" | "fs" | "local" => Some(Self::Filesystem),
            _ => None,
        }
    }
}

/// Blob store configuration
#[derive(Debug, Clone)]
pub enum BlobStoreConfig {
    InMemory,
    Filesystem { root: PathBuf },
}

impl BlobStoreConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::Filesystem { root: root.into() }
    }

    pub fn store_type(&self) -> BlobStoreType {
        match self {
            Self::InMemory => BlobStoreType::InMemory,
            Self::Filesystem { .. } => BlobStoreType::Filesystem,
        }
    }
}

/// Factory for creating blob stores
#[derive(Debug)]
pub struct BlobStoreFactory;

impl BlobStoreFactory {
    pub fn create(config: &BlobStoreConfig) -> Arc<dyn BlobStore> {
        match config {
            BlobStoreConfig::InMemory => Arc::new(InMemoryBlobStore::new()),
            BlobStoreConfig::Filesystem { root } => Arc::new(FilesystemBlobStore::new(root)),
        }
    }
}
