//! Authenticated actor domain module
//!
//! The save path stamps every record with the identity of whoever is signed
//! in. Sign-in itself happens outside this crate; only the lookup is modelled.

mod actor;

pub use actor::{ActorId, ActorProvider};

#[cfg(test)]
pub use actor::MockActorProvider;
