//! In-memory document store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::id::generate_document_id;
use crate::domain::document::{Document, DocumentStore, Snapshot, SnapshotStream};
use crate::domain::fields::FieldMap;
use crate::domain::DomainError;

#[derive(Debug)]
struct Collection {
    documents: Vec<Document>,
    snapshots: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (snapshots, _) = watch::channel(Snapshot::default());

        Self {
            documents: Vec::new(),
            snapshots,
        }
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(Snapshot::new(self.documents.clone()));
    }
}

/// Thread-safe in-memory document store
///
/// Documents keep insertion order. Each collection publishes its full
/// membership on a watch channel after every write, so subscribers always
/// start from the latest snapshot. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|collections| {
                collections
                    .get(collection)
                    .map_or(0, |c| c.documents.len())
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: FieldMap,
    ) -> Result<String, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::store_write(format!("Failed to acquire write lock: {}", e))
        })?;

        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);

        let id = match id {
            Some(id) => id.to_string(),
            None => generate_document_id(),
        };

        match entry.documents.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.fields = fields,
            None => entry.documents.push(Document::new(id.clone(), fields)),
        }

        entry.publish();
        debug!(collection = %collection, id = %id, "Document upserted");

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<FieldMap>, DomainError> {
        let collections = self.collections.read().map_err(|e| {
            DomainError::store_read(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(collections.get(collection).and_then(|c| {
            c.documents
                .iter()
                .find(|doc| doc.id == id)
                .map(|doc| doc.fields.clone())
        }))
    }

    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::subscription(format!("Failed to acquire write lock: {}", e))
        })?;

        let receiver = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new)
            .snapshots
            .subscribe();

        debug!(collection = %collection, "Subscribed to collection");

        Ok(Box::pin(
            WatchStream::new(receiver).map(Ok::<Snapshot, DomainError>),
        ))
    }
}
