//! Team infrastructure - save workflow, photo hydration and the live mirror

mod lookup;
mod mirror;
mod photo;
mod save;

pub use lookup::load_team;
pub use mirror::{MirrorStatus, TeamMirror};
pub use photo::TeamPhotoLoader;
pub use save::{SaveError, SavePhase, TeamSaveService};
