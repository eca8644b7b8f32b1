//! Document store domain - port to the remote structured store

mod store;

pub use store::{Document, DocumentStore, Snapshot, SnapshotStream};

#[cfg(test)]
pub use store::mock;
