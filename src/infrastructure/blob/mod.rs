//! Blob store infrastructure - BlobStore implementations

mod factory;
mod filesystem;
mod in_memory;

pub use factory::{BlobStoreConfig, BlobStoreFactory, BlobStoreType};
pub use filesystem::FilesystemBlobStore;
pub use in_memory::InMemoryBlobStore;
