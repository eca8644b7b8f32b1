//! Document store infrastructure - DocumentStore implementations

mod factory;
mod id;
mod in_memory;
mod postgres;

pub use factory::{DocumentStoreConfig, DocumentStoreFactory, DocumentStoreType};
pub use id::generate_document_id;
pub use in_memory::InMemoryDocumentStore;
pub use postgres::{PostgresConfig, PostgresDocumentStore};
