use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::blob::{MAX_PHOTO_BYTES, PHOTO_CONTENT_TYPE};
use crate::domain::team::TEAMS_COLLECTION;
use crate::domain::DomainError;
use crate::infrastructure::blob::{BlobStoreConfig, BlobStoreType};
use crate::infrastructure::document::{DocumentStoreConfig, DocumentStoreType, PostgresConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub document_store: DocumentStoreSettings,
    pub blob_store: BlobStoreSettings,
    pub assets: AssetsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentStoreSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub url: Option<String>,
    pub max_connections: u32,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlobStoreSettings {
    /// `memory` or `filesystem`
    pub backend: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub max_download_bytes: usize,
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for HS256 ID tokens; token sign-in is unavailable without it
    pub jwt_secret: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DocumentStoreSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: None,
            max_connections: 10,
            collection: TEAMS_COLLECTION.to_string(),
        }
    }
}

impl Default for BlobStoreSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            root: PathBuf::from("data/blobs"),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            max_download_bytes: MAX_PHOTO_BYTES,
            content_type: PHOTO_CONTENT_TYPE.to_string(),
        }
    }
}

impl DocumentStoreSettings {
    pub fn to_store_config(&self) -> Result<DocumentStoreConfig, DomainError> {
        let backend = DocumentStoreType::from_str(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown document store: {}", self.backend))
        })?;

        match backend {
            DocumentStoreType::InMemory => Ok(DocumentStoreConfig::InMemory),
            DocumentStoreType::Postgres => {
                let url = self.url.clone().ok_or_else(|| {
                    DomainError::configuration("document_store.url is required for postgres")
                })?;

                Ok(DocumentStoreConfig::Postgres(
                    PostgresConfig::new(url).with_max_connections(self.max_connections),
                ))
            }
        }
    }
}

impl BlobStoreSettings {
    pub fn to_store_config(&self) -> Result<BlobStoreConfig, DomainError> {
        let backend = BlobStoreType::from_str(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown blob store: {}", self.backend))
        })?;

        Ok(match backend {
            BlobStoreType::InMemory => BlobStoreConfig::InMemory,
            BlobStoreType::Filesystem => BlobStoreConfig::Filesystem {
                root: self.root.clone(),
            },
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
