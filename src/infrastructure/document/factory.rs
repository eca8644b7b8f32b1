//! Document store factory for runtime backend selection

use std::sync::Arc;

use crate::domain::document::DocumentStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryDocumentStore;
use super::postgres::{PostgresConfig, PostgresDocumentStore};

/// Supported document store backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreType {
    /// In-memory store (for testing/development)
    InMemory,
    /// PostgreSQL store
    Postgres,
}

impl DocumentStoreType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone)]
pub enum DocumentStoreConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl DocumentStoreConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn store_type(&self) -> DocumentStoreType {
        match self {
            Self::InMemory => DocumentStoreType::InMemory,
            Self::Postgres(_) => DocumentStoreType::Postgres,
        }
    }
}

/// Factory for creating document stores
#[derive(Debug)]
pub struct DocumentStoreFactory;

impl DocumentStoreFactory {
    pub async fn create(
        config: &DocumentStoreConfig,
    ) -> Result<Arc<dyn DocumentStore>, DomainError> {
        match config {
            DocumentStoreConfig::InMemory => Ok(Arc::new(InMemoryDocumentStore::new())),
            DocumentStoreConfig::Postgres(pg_config) => {
                Ok(Arc::new(PostgresDocumentStore::connect(pg_config).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_from_str() {
        assert_eq!(
            DocumentStoreType::from_str("memory"),
            Some(DocumentStoreType::InMemory)
        );
        assert_eq!(
            DocumentStoreType::from_str("PostgreSQL"),
            Some(DocumentStoreType::Postgres)
        );
        assert_eq!(DocumentStoreType::from_str("firestore"), None);
    }

    #[test]
    fn test_config_store_type() {
        assert_eq!(
            DocumentStoreConfig::in_memory().store_type(),
            DocumentStoreType::InMemory
        );
        assert_eq!(
            DocumentStoreConfig::postgres_url("postgres://db").store_type(),
            DocumentStoreType::Postgres
        );
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let store = DocumentStoreFactory::create(&DocumentStoreConfig::in_memory())
            .await
            .unwrap();

        let id = store
            .upsert("teams", None, Default::default())
            .await
            .unwrap();
        assert!(store.get("teams", &id).await.unwrap().is_some());
    }
}
