//! Two-phase save of a team record and its photo

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::auth::{ActorId, ActorProvider};
use crate::domain::blob::{BlobPath, BlobStore, PHOTO_CONTENT_TYPE};
use crate::domain::document::DocumentStore;
use crate::domain::team::{Team, TeamId, TEAMS_COLLECTION};
use crate::domain::DomainError;

/// The phase of a save that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    /// Writing the record's fields (nothing new is durable)
    Record,
    /// Uploading the photo or re-writing the record with its reference
    /// (the record's text fields are durable)
    Photo,
}

/// Failure of a team save, tagged with the phase it happened in
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to save team record: {0}")]
    Record(#[source] DomainError),

    #[error("Team '{team_id}' was saved but its photo was not: {source}")]
    Photo {
        team_id: TeamId,
        #[source]
        source: DomainError,
    },
}

impl SaveError {
    pub fn phase(&self) -> SavePhase {
        match self {
            Self::Record(_) => SavePhase::Record,
            Self::Photo { .. } => SavePhase::Photo,
        }
    }

    /// Whether the record's text fields reached the store
    pub fn record_persisted(&self) -> bool {
        self.phase() == SavePhase::Photo
    }

    /// The underlying store, blob or auth error
    pub fn error(&self) -> &DomainError {
        match self {
            Self::Record(error) => error,
            Self::Photo { source, .. } => source,
        }
    }
}

/// Persists teams to the document store and their photos to the blob store
///
/// A save runs strictly in order: record upsert, then (only with a new photo)
/// photo upload, then a second upsert by id carrying the photo reference. The
/// two stores share no transaction, so a failure after the first upsert is
/// reported as [`SaveError::Photo`] and leaves the text fields saved.
/// Concurrent saves of the same team are not serialized; the store keeps the
/// last write.
pub struct TeamSaveService {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    collection: String,
    content_type: String,
}

impl std::fmt::Debug for TeamSaveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamSaveService")
            .field("collection", &self.collection)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl TeamSaveService {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            documents,
            blobs,
            collection: TEAMS_COLLECTION.to_string(),
            content_type: PHOTO_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Save a team and, when given, its new photo
    ///
    /// On success the team carries its store id and the stored fields equal
    /// `team.to_fields()`. Without a signed-in actor nothing is written.
    pub async fn save(
        &self,
        team: &mut Team,
        actor: &dyn ActorProvider,
        photo: Option<Bytes>,
    ) -> Result<TeamId, SaveError> {
        let owner = current_owner(actor).map_err(SaveError::Record)?;

        let id = self
            .persist_record(team, &owner)
            .await
            .map_err(|e| {
                counter!("team_saves_total", "outcome" => "record_failed").increment(1);
                warn!(error = %e, "Team record save failed");
                SaveError::Record(e)
            })?;

        if let Some(photo) = photo {
            self.persist_photo(team, &owner, &id, photo).await?;
        }

        counter!("team_saves_total", "outcome" => "success").increment(1);
        Ok(id)
    }

    /// Upload a photo for an already persisted team and relink the record
    ///
    /// This is the retry path after a [`SaveError::Photo`]: the team keeps
    /// the reference minted by the failed attempt, so the retry writes to the
    /// same path.
    pub async fn save_photo(
        &self,
        team: &mut Team,
        actor: &dyn ActorProvider,
        photo: Bytes,
    ) -> Result<TeamId, SaveError> {
        let owner = current_owner(actor).map_err(SaveError::Record)?;

        let id = team.id().cloned().ok_or_else(|| {
            SaveError::Record(DomainError::validation(
                "Team must be saved before a photo can be attached",
            ))
        })?;

        self.persist_photo(team, &owner, &id, photo).await?;
        Ok(id)
    }

    async fn persist_record(&self, team: &mut Team, owner: &ActorId) -> Result<TeamId, DomainError> {
        team.stamp_owner(owner.clone());

        let existing = team.id().map(|id| id.as_str().to_string());
        let stored_id = self
            .documents
            .upsert(&self.collection, existing.as_deref(), team.to_fields())
            .await?;

        let stored_id = TeamId::new(stored_id).map_err(|e| {
            DomainError::store_write(format!("Store returned an unusable id: {}", e))
        })?;
        team.adopt_id(stored_id.clone());

        let id = team.id().cloned().unwrap_or(stored_id);
        info!(id = %id, owner = %owner, created = existing.is_none(), "Team record saved");

        Ok(id)
    }

    async fn persist_photo(
        &self,
        team: &mut Team,
        owner: &ActorId,
        id: &TeamId,
        photo: Bytes,
    ) -> Result<(), SaveError> {
        let photo_error = |source: DomainError| {
            counter!("team_saves_total", "outcome" => "photo_failed").increment(1);
            warn!(id = %id, error = %source, "Team photo save failed");
            SaveError::Photo {
                team_id: id.clone(),
                source,
            }
        };

        let path = BlobPath::new(id.clone(), team.ensure_photo_ref()).map_err(|e| {
            photo_error(DomainError::validation(format!(
                "Photo cannot be stored for this team: {}",
                e
            )))
        })?;
        let size = photo.len();

        match self.blobs.put(&path, photo, &self.content_type).await {
            Ok(()) => {
                counter!("team_asset_uploads_total", "outcome" => "success").increment(1);
                info!(path = %path, size, "Team photo uploaded");
            }
            Err(e) => {
                counter!("team_asset_uploads_total", "outcome" => "failure").increment(1);
                return Err(photo_error(e));
            }
        }

        self.persist_record(team, owner).await.map_err(photo_error)?;
        Ok(())
    }
}

fn current_owner(actor: &dyn ActorProvider) -> Result<ActorId, DomainError> {
    // An empty id identifies nobody.
    actor
        .current_actor()
        .filter(|actor| !actor.as_str().is_empty())
        .ok_or_else(|| {
            counter!("team_saves_total", "outcome" => "unauthenticated").increment(1);
            DomainError::auth_required("No signed-in user; team was not saved")
        })
}
