//! Blob store domain - port to the remote binary store

mod path;
mod store;

pub use path::BlobPath;
pub use store::BlobStore;

#[cfg(test)]
pub use store::MockBlobStore;

/// Content type used for team photos
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Upper bound on a downloaded team photo (5 MiB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
