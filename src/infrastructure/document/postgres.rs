//! PostgreSQL document store with LISTEN/NOTIFY push delivery

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use sqlx::Row;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use super::id::generate_document_id;
use crate::domain::document::{Document, DocumentStore, Snapshot, SnapshotStream};
use crate::domain::fields::FieldMap;
use crate::domain::DomainError;

const SNAPSHOT_BUFFER: usize = 16;

/// PostgreSQL document store configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Table holding every collection's documents
    pub table_name: String,
    /// Notification channel used to signal collection changes
    pub notify_channel: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/team_sync".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
            table_name: "documents".to_string(),
            notify_channel: "document_changes".to_string(),
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }
}

/// PostgreSQL document store
///
/// Documents live in one JSONB table keyed by `(collection, id)`. Every write
/// commits together with a `pg_notify` carrying the collection name; each
/// subscription listens on that channel and re-reads the full collection when
/// its name comes through.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    table_name: String,
    notify_channel: String,
}

impl Debug for PostgresDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDocumentStore")
            .field("table_name", &self.table_name)
            .field("notify_channel", &self.notify_channel)
            .finish()
    }
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool, config: &PostgresConfig) -> Self {
        Self {
            pool,
            table_name: config.table_name.clone(),
            notify_channel: config.notify_channel.clone(),
        }
    }

    /// Connects a pool and ensures the documents table exists
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                DomainError::configuration(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        let store = Self::new(pool, config);
        store.ensure_table().await?;
        Ok(store)
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                collection VARCHAR(255) NOT NULL,
                id VARCHAR(255) NOT NULL,
                fields JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::configuration(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    async fn fetch_snapshot(&self, collection: &str) -> Result<Snapshot, DomainError> {
        let query = format!(
            "SELECT id, fields FROM {} WHERE collection = $1 ORDER BY created_at, id",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::subscription(format!("Failed to read snapshot: {}", e)))?;

        let mut documents = Vec::with_capacity(rows.len());

        for row in rows {
            let id: String = row.get("id");
            let fields: Value = row.get("fields");
            documents.push(Document::new(id, into_field_map(fields)));
        }

        Ok(Snapshot::new(documents))
    }

    async fn listen(
        self,
        mut listener: PgListener,
        collection: String,
        tx: mpsc::Sender<Result<Snapshot, DomainError>>,
    ) {
        loop {
            let received = tokio::select! {
                _ = tx.closed() => break,
                received = listener.try_recv() => received,
            };

            let step = next_step(
                received
                    .as_ref()
                    .map(|notification| notification.as_ref().map(|n| n.payload())),
                &collection,
            );

            match step {
                ListenStep::Skip => continue,
                ListenStep::Refresh => {
                    let snapshot = self.fetch_snapshot(&collection).await;
                    let failed = snapshot.is_err();

                    if tx.send(snapshot).await.is_err() || failed {
                        break;
                    }
                }
                ListenStep::Fail(error) => {
                    warn!(collection = %collection, error = %error, "Listener stopped on error");
                    let _ = tx.send(Err(error)).await;
                    break;
                }
            }
        }

        debug!(collection = %collection, "Listener stopped");
    }
}

/// What a listener does with one receive result
#[derive(Debug)]
enum ListenStep {
    /// Notification for another collection
    Skip,
    /// The collection changed; send a fresh snapshot
    Refresh,
    /// Terminal: report and end the stream
    Fail(DomainError),
}

fn next_step(received: Result<Option<&str>, &sqlx::Error>, collection: &str) -> ListenStep {
    match received {
        Ok(Some(payload)) if payload == collection => ListenStep::Refresh,
        Ok(Some(_)) => ListenStep::Skip,
        // Changes may have been missed while disconnected.
        Ok(None) => ListenStep::Fail(DomainError::subscription("Listener connection lost")),
        Err(e) => ListenStep::Fail(DomainError::subscription(format!("Listener failed: {}", e))),
    }
}

fn into_field_map(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        _ => FieldMap::new(),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn upsert(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: FieldMap,
    ) -> Result<String, DomainError> {
        let id = id.map_or_else(generate_document_id, str::to_string);

        let query = format!(
            r#"
            INSERT INTO {} (collection, id, fields)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()
            "#,
            self.table_name
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::store_write(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(&query)
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(fields))
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::store_write(format!("Failed to upsert document: {}", e)))?;

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.notify_channel)
            .bind(collection)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::store_write(format!("Failed to notify change: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::store_write(format!("Failed to commit document: {}", e)))?;

        debug!(collection = %collection, id = %id, "Document upserted");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<FieldMap>, DomainError> {
        let query = format!(
            "SELECT fields FROM {} WHERE collection = $1 AND id = $2",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::store_read(format!("Failed to get document: {}", e)))?;

        Ok(row.map(|row| into_field_map(row.get("fields"))))
    }

    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, DomainError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| DomainError::subscription(format!("Failed to connect listener: {}", e)))?;

        listener
            .listen(&self.notify_channel)
            .await
            .map_err(|e| DomainError::subscription(format!("Failed to listen: {}", e)))?;

        // Read after LISTEN so no change can slip between the two.
        let initial = self.fetch_snapshot(collection).await?;

        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let _ = tx.send(Ok(initial)).await;

        tokio::spawn(self.clone().listen(listener, collection.to_string(), tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
