//! Team Sync
//!
//! Client-side synchronization layer for team records:
//! - Two-phase save of a team record and its photo
//! - Photo hydration with a bounded download size
//! - A live mirror of the teams collection driven by push snapshots

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use domain::{ActorId, ActorProvider, BlobStore, DocumentStore, DomainError};
use infrastructure::{
    auth::{IdTokenService, SessionActorProvider, TokenActorProvider},
    blob::BlobStoreFactory,
    document::DocumentStoreFactory,
    team::{TeamMirror, TeamPhotoLoader, TeamSaveService},
};
use tracing::info;

/// Stores and services wired from configuration
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub saver: Arc<TeamSaveService>,
    pub photos: TeamPhotoLoader,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("documents", &self.documents)
            .field("saver", &self.saver)
            .field("photos", &self.photos)
            .finish()
    }
}

impl AppContext {
    pub fn collection(&self) -> &str {
        &self.config.document_store.collection
    }

    /// A fresh, unsubscribed mirror of the configured collection
    pub fn mirror(&self) -> TeamMirror {
        TeamMirror::new(self.documents.clone()).with_collection(self.collection())
    }

    /// Resolve the acting user from an explicit actor id or an ID token
    ///
    /// Neither given yields a provider with nobody signed in.
    pub fn actor_provider(
        &self,
        actor: Option<&str>,
        token: Option<&str>,
    ) -> Result<Arc<dyn ActorProvider>, DomainError> {
        if let Some(token) = token {
            let secret = self.config.auth.jwt_secret.as_deref().ok_or_else(|| {
                DomainError::configuration("auth.jwt_secret is required for token sign-in")
            })?;

            let provider = TokenActorProvider::new(IdTokenService::new(secret));
            provider.sign_in(token)?;
            return Ok(Arc::new(provider));
        }

        Ok(match actor {
            Some(actor) => Arc::new(SessionActorProvider::signed_in(ActorId::new(actor))),
            None => Arc::new(SessionActorProvider::new()),
        })
    }
}

/// Create the application context with default configuration
pub async fn create_app_context() -> anyhow::Result<AppContext> {
    create_app_context_with_config(&AppConfig::default()).await
}

/// Create the application context with custom configuration
pub async fn create_app_context_with_config(config: &AppConfig) -> anyhow::Result<AppContext> {
    let document_config = config.document_store.to_store_config()?;
    let documents = DocumentStoreFactory::create(&document_config).await?;
    info!(backend = ?document_config.store_type(), "Document store ready");

    let blob_config = config.blob_store.to_store_config()?;
    let blobs = BlobStoreFactory::create(&blob_config);
    info!(backend = ?blob_config.store_type(), "Blob store ready");

    let saver = TeamSaveService::new(documents.clone(), blobs.clone())
        .with_collection(config.document_store.collection.clone())
        .with_content_type(config.assets.content_type.clone());

    let photos =
        TeamPhotoLoader::new(blobs.clone()).with_max_bytes(config.assets.max_download_bytes);

    Ok(AppContext {
        config: config.clone(),
        documents,
        blobs,
        saver: Arc::new(saver),
        photos,
    })
}
