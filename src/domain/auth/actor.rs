//! Actor identity and lookup port

use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

/// Opaque identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Synchronous lookup of the currently authenticated actor
#[cfg_attr(test, automock)]
pub trait ActorProvider: Send + Sync {
    /// Returns the signed-in actor, or `None` when nobody is signed in
    fn current_actor(&self) -> Option<ActorId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_display() {
        let actor = ActorId::new("u1");
        assert_eq!(actor.as_str(), "u1");
        assert_eq!(actor.to_string(), "u1");
    }

    #[test]
    fn test_mock_provider() {
        let mut provider = MockActorProvider::new();
        provider
            .expect_current_actor()
            .returning(|| Some(ActorId::from("u1")));

        assert_eq!(provider.current_actor(), Some(ActorId::new("u1")));
    }
}
