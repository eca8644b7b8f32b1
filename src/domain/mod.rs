//! Domain layer - Team record, ports and error taxonomy

pub mod auth;
pub mod blob;
pub mod document;
pub mod error;
pub mod fields;
pub mod team;

pub use auth::{ActorId, ActorProvider};
pub use blob::{BlobPath, BlobStore, MAX_PHOTO_BYTES, PHOTO_CONTENT_TYPE};
pub use document::{Document, DocumentStore, Snapshot, SnapshotStream};
pub use error::{BlobReadErrorKind, DomainError};
pub use fields::FieldMap;
pub use team::{Coordinate, PhotoRef, Team, TeamId, TeamValidationError, TEAMS_COLLECTION};
