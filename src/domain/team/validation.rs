//! Identifier validation for team records and their photo references

use thiserror::Error;

/// Errors that can occur while validating record identifiers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team ID cannot be empty")]
    EmptyId,

    #[error("Photo reference cannot be empty")]
    EmptyPhotoRef,

    #[error("Path segment cannot exceed {0} characters")]
    SegmentTooLong(usize),

    #[error("Path segment '{0}' contains a path separator or is a relative path component")]
    InvalidSegment(String),
}

const MAX_SEGMENT_LENGTH: usize = 255;

/// Validate a value used as a single blob path segment
pub fn validate_path_segment(segment: &str) -> Result<(), TeamValidationError> {
    if segment.is_empty() {
        return Err(TeamValidationError::InvalidSegment(String::new()));
    }

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(TeamValidationError::SegmentTooLong(MAX_SEGMENT_LENGTH));
    }

    if segment == "." || segment == ".." || segment.contains(['/', '\\']) {
        return Err(TeamValidationError::InvalidSegment(segment.to_string()));
    }

    Ok(())
}

/// Validate a team ID
///
/// Any non-empty store id is accepted. Path safety is checked only where the
/// id becomes a blob path segment.
pub fn validate_team_id(id: &str) -> Result<(), TeamValidationError> {
    if id.is_empty() {
        return Err(TeamValidationError::EmptyId);
    }

    Ok(())
}

/// Validate a photo (asset) reference
pub fn validate_photo_ref(reference: &str) -> Result<(), TeamValidationError> {
    if reference.is_empty() {
        return Err(TeamValidationError::EmptyPhotoRef);
    }

    Ok(())
}
