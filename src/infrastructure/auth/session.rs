//! Session-backed actor provider

use std::sync::RwLock;

use tracing::info;

use crate::domain::auth::{ActorId, ActorProvider};

/// Holds the signed-in actor for the running client
///
/// The sign-in flow calls `sign_in`/`sign_out`; the save path only reads.
#[derive(Debug, Default)]
pub struct SessionActorProvider {
    actor: RwLock<Option<ActorId>>,
}

impl SessionActorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already signed in
    pub fn signed_in(actor: ActorId) -> Self {
        Self {
            actor: RwLock::new(Some(actor)),
        }
    }

    pub fn sign_in(&self, actor: ActorId) {
        info!(actor = %actor, "Actor signed in");
        *self.actor.write().unwrap_or_else(|e| e.into_inner()) = Some(actor);
    }

    pub fn sign_out(&self) {
        if let Some(actor) = self.actor.write().unwrap_or_else(|e| e.into_inner()).take() {
            info!(actor = %actor, "Actor signed out");
        }
    }
}

impl ActorProvider for SessionActorProvider {
    fn current_actor(&self) -> Option<ActorId> {
        self.actor
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
