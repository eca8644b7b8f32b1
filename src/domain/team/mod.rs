//! Team domain module
//!
//! A team is the record mirrored from the remote `teams` collection. Its
//! photo lives in the blob store and is joined to the record by reference.

mod entity;
mod validation;

pub use entity::{field, Coordinate, PhotoRef, Team, TeamId};
pub use validation::{
    validate_path_segment, validate_photo_ref, validate_team_id, TeamValidationError,
};

/// Collection holding team documents
pub const TEAMS_COLLECTION: &str = "teams";
