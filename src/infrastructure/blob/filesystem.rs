//! Filesystem blob store implementation

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::domain::blob::{BlobPath, BlobStore};
use crate::domain::{BlobReadErrorKind, DomainError};

/// Blob store rooted at a local directory
///
/// A blob at `<team>/<photo>` lives at `<root>/<team>/<photo>`, with its
/// content type in a hidden `.<photo>.content-type` sidecar. Both are staged
/// as temporary files; the blob is renamed into place first and the sidecar
/// only after that succeeds.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, path: &BlobPath) -> PathBuf {
        self.root.join(path.team_id().as_str())
    }

    fn file_path(&self, path: &BlobPath) -> PathBuf {
        self.namespace_dir(path).join(path.photo_ref().as_str())
    }

    fn sidecar_path(&self, path: &BlobPath) -> PathBuf {
        self.namespace_dir(path)
            .join(format!(".{}.content-type", path.photo_ref().as_str()))
    }

    /// Content type recorded for a stored blob
    pub async fn content_type(&self, path: &BlobPath) -> Option<String> {
        fs::read_to_string(self.sidecar_path(path)).await.ok()
    }

    /// Stage both files, then move the blob and its sidecar into place
    async fn commit(
        &self,
        path: &BlobPath,
        staged: &[PathBuf; 2],
        bytes: &Bytes,
        content_type: &str,
    ) -> std::io::Result<()> {
        let [blob_temp, type_temp] = staged;

        fs::write(blob_temp, bytes).await?;
        fs::write(type_temp, content_type).await?;
        fs::rename(blob_temp, self.file_path(path)).await?;
        fs::rename(type_temp, self.sidecar_path(path)).await
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        path: &BlobPath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), DomainError> {
        let write_error = |e: std::io::Error| DomainError::blob_write(path.to_string(), e.to_string());

        let dir = self.namespace_dir(path);
        fs::create_dir_all(&dir).await.map_err(write_error)?;

        let leaf = path.photo_ref().as_str();
        let token = Uuid::new_v4().simple();
        let staged = [
            dir.join(format!(".{}.{}.tmp", leaf, token)),
            dir.join(format!(".{}.content-type.{}.tmp", leaf, token)),
        ];

        if let Err(e) = self.commit(path, &staged, &bytes, content_type).await {
            for temp in &staged {
                let _ = fs::remove_file(temp).await;
            }
            return Err(write_error(e));
        }

        debug!(path = %path, size = bytes.len(), "Blob written");
        Ok(())
    }

    async fn get(&self, path: &BlobPath, max_bytes: usize) -> Result<Bytes, DomainError> {
        let file = self.file_path(path);
        let read_error = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => DomainError::blob_not_found(path.to_string()),
            _ => DomainError::blob_read(BlobReadErrorKind::Transport, path.to_string(), e.to_string()),
        };

        let size = fs::metadata(&file).await.map_err(read_error)?.len();

        if size > max_bytes as u64 {
            return Err(DomainError::blob_too_large(path.to_string(), size, max_bytes));
        }

        let bytes = fs::read(&file).await.map_err(read_error)?;

        // The file may have been replaced between the size check and the read.
        if bytes.len() > max_bytes {
            return Err(DomainError::blob_too_large(
                path.to_string(),
                bytes.len() as u64,
                max_bytes,
            ));
        }

        Ok(Bytes::from(bytes))
    }
}
