//! Document store trait definition

use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::fields::FieldMap;
use crate::domain::DomainError;

/// A stored document: store-assigned id plus its flat field map
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: FieldMap,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Full membership of a collection at one point in time, in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    documents: Vec<Document>,
}

impl Snapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl IntoIterator for Snapshot {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Push channel of full snapshots
///
/// The first item is the current membership; every later item follows a
/// change. An `Err` item is terminal: nothing is delivered after it. Dropping
/// the stream cancels the subscription.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot, DomainError>> + Send>>;

/// Remote structured storage addressed by collection and id
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Creates a document with a generated id when `id` is `None`, otherwise
    /// fully replaces the document at `id`. Returns the document id.
    ///
    /// Atomic from the caller's view: on failure the previous state is intact.
    /// Fails with `DomainError::StoreWrite`.
    async fn upsert(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: FieldMap,
    ) -> Result<String, DomainError>;

    /// Loads a single document's fields by id
    async fn get(&self, collection: &str, id: &str) -> Result<Option<FieldMap>, DomainError>;

    /// Subscribes to full snapshots of a collection
    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    /// A recorded `upsert` call
    #[derive(Debug, Clone, PartialEq)]
    pub struct UpsertCall {
        pub collection: String,
        pub id: Option<String>,
        pub fields: FieldMap,
    }

    type Subscriber = mpsc::UnboundedSender<Result<Snapshot, DomainError>>;

    /// Recording document store for testing
    ///
    /// Keeps a single ordered collection, logs every upsert, can fail chosen
    /// upsert calls and lets tests push snapshots or errors to subscribers.
    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        documents: Mutex<Vec<Document>>,
        upserts: Mutex<Vec<UpsertCall>>,
        failing_upserts: Mutex<Vec<usize>>,
        fail_subscribe: Mutex<Option<String>>,
        subscribers: Mutex<Vec<Subscriber>>,
        subscribe_calls: Mutex<usize>,
    }

    impl MockDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_document(self, id: impl Into<String>, fields: FieldMap) -> Self {
            self.documents
                .lock()
                .unwrap()
                .push(Document::new(id, fields));
            self
        }

        /// Fail the n-th upsert call (1-based)
        pub fn with_upsert_failure_on(self, call: usize) -> Self {
            self.failing_upserts.lock().unwrap().push(call);
            self
        }

        pub fn with_subscribe_error(self, error: impl Into<String>) -> Self {
            *self.fail_subscribe.lock().unwrap() = Some(error.into());
            self
        }

        pub fn upsert_calls(&self) -> Vec<UpsertCall> {
            self.upserts.lock().unwrap().clone()
        }

        pub fn upsert_count(&self) -> usize {
            self.upserts.lock().unwrap().len()
        }

        pub fn subscribe_count(&self) -> usize {
            *self.subscribe_calls.lock().unwrap()
        }

        /// Subscribers whose stream has not been dropped
        pub fn live_subscribers(&self) -> usize {
            self.subscribers
                .lock()
                .unwrap()
                .iter()
                .filter(|tx| !tx.is_closed())
                .count()
        }

        pub fn stored(&self, id: &str) -> Option<FieldMap> {
            self.documents
                .lock()
                .unwrap()
                .iter()
                .find(|doc| doc.id == id)
                .map(|doc| doc.fields.clone())
        }

        pub fn snapshot(&self) -> Snapshot {
            Snapshot::new(self.documents.lock().unwrap().clone())
        }

        /// Deliver a snapshot to every live subscriber
        pub fn push_snapshot(&self, snapshot: Snapshot) {
            for tx in self.subscribers.lock().unwrap().iter() {
                let _ = tx.send(Ok(snapshot.clone()));
            }
        }

        /// Deliver a terminal error to every live subscriber
        pub fn push_error(&self, message: &str) {
            let mut subscribers = self.subscribers.lock().unwrap();

            for tx in subscribers.iter() {
                let _ = tx.send(Err(DomainError::subscription(message)));
            }

            subscribers.clear();
        }
    }

    #[async_trait]
    impl DocumentStore for MockDocumentStore {
        async fn upsert(
            &self,
            collection: &str,
            id: Option<&str>,
            fields: FieldMap,
        ) -> Result<String, DomainError> {
            let call_number = {
                let mut upserts = self.upserts.lock().unwrap();
                upserts.push(UpsertCall {
                    collection: collection.to_string(),
                    id: id.map(str::to_string),
                    fields: fields.clone(),
                });
                upserts.len()
            };

            if self.failing_upserts.lock().unwrap().contains(&call_number) {
                return Err(DomainError::store_write(format!(
                    "Simulated failure on upsert #{}",
                    call_number
                )));
            }

            let snapshot = {
                let mut documents = self.documents.lock().unwrap();
                let id = match id {
                    Some(id) => id.to_string(),
                    None => format!("doc-{}", documents.len() + 1),
                };

                match documents.iter_mut().find(|doc| doc.id == id) {
                    Some(doc) => doc.fields = fields,
                    None => documents.push(Document::new(id.clone(), fields)),
                }

                (id, Snapshot::new(documents.clone()))
            };

            self.push_snapshot(snapshot.1);
            Ok(snapshot.0)
        }

        async fn get(&self, _collection: &str, id: &str) -> Result<Option<FieldMap>, DomainError> {
            Ok(self.stored(id))
        }

        async fn subscribe(&self, _collection: &str) -> Result<SnapshotStream, DomainError> {
            *self.subscribe_calls.lock().unwrap() += 1;

            if let Some(error) = self.fail_subscribe.lock().unwrap().clone() {
                return Err(DomainError::subscription(error));
            }

            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(Ok(self.snapshot()));
            self.subscribers.lock().unwrap().push(tx);

            Ok(Box::pin(UnboundedReceiverStream::new(rx)))
        }
    }
}
