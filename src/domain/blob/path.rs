//! Blob addressing

use crate::domain::team::{validate_path_segment, PhotoRef, TeamId, TeamValidationError};

/// Address of a blob: `<team id>/<photo reference>`
///
/// Both parts must be usable as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath {
    team_id: TeamId,
    photo_ref: PhotoRef,
}

impl BlobPath {
    pub fn new(team_id: TeamId, photo_ref: PhotoRef) -> Result<Self, TeamValidationError> {
        validate_path_segment(team_id.as_str())?;
        validate_path_segment(photo_ref.as_str())?;

        Ok(Self { team_id, photo_ref })
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn photo_ref(&self) -> &PhotoRef {
        &self.photo_ref
    }

    /// Path segments from outermost namespace to leaf
    pub fn segments(&self) -> [&str; 2] {
        [self.team_id.as_str(), self.photo_ref.as_str()]
    }
}

impl std::fmt::Display for BlobPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.team_id, self.photo_ref)
    }
}
