//! Blob store trait definition

use async_trait::async_trait;
use bytes::Bytes;

use super::path::BlobPath;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Remote binary storage addressed by path
///
/// Every call yields exactly one terminal outcome, however many round trips
/// the backend needs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads content, creating intermediate namespace segments implicitly.
    /// Fails with `DomainError::BlobWrite`.
    async fn put(&self, path: &BlobPath, bytes: Bytes, content_type: &str)
        -> Result<(), DomainError>;

    /// Downloads content. Payloads larger than `max_bytes` are rejected, never
    /// truncated. Fails with `DomainError::BlobRead`.
    async fn get(&self, path: &BlobPath, max_bytes: usize) -> Result<Bytes, DomainError>;
}
