//! Team photo hydration

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use tracing::debug;

use crate::domain::blob::{BlobPath, BlobStore, MAX_PHOTO_BYTES};
use crate::domain::team::Team;
use crate::domain::{BlobReadErrorKind, DomainError};

/// Downloads the photo a team references
#[derive(Clone)]
pub struct TeamPhotoLoader {
    blobs: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl std::fmt::Debug for TeamPhotoLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamPhotoLoader")
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

impl TeamPhotoLoader {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            max_bytes: MAX_PHOTO_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Fetch the team's photo
    ///
    /// Returns `None` without touching the blob store when the team has no
    /// photo reference. Read failures are returned as-is; choosing a
    /// placeholder is up to the caller.
    pub async fn hydrate(&self, team: &Team) -> Result<Option<Bytes>, DomainError> {
        let Some(photo_ref) = team.photo_ref() else {
            return Ok(None);
        };

        // A reference on an unsaved team cannot have been uploaded.
        let Some(id) = team.id() else {
            return Err(DomainError::blob_not_found(format!("<unsaved>/{}", photo_ref)));
        };

        // A reference that cannot be a path segment was never uploaded here.
        let path = BlobPath::new(id.clone(), photo_ref.clone()).map_err(|e| {
            DomainError::blob_read(
                BlobReadErrorKind::NotFound,
                format!("{}/{}", id, photo_ref),
                e.to_string(),
            )
        })?;

        match self.blobs.get(&path, self.max_bytes).await {
            Ok(bytes) => {
                counter!("team_asset_downloads_total", "outcome" => "success").increment(1);
                debug!(path = %path, size = bytes.len(), "Team photo loaded");
                Ok(Some(bytes))
            }
            Err(e) => {
                counter!("team_asset_downloads_total", "outcome" => "failure").increment(1);
                Err(e)
            }
        }
    }
}
