//! Authentication infrastructure module
//!
//! Actor providers the save path reads the signed-in user from.

mod id_token;
mod session;

pub use id_token::{IdTokenClaims, IdTokenService, TokenActorProvider};
pub use session::SessionActorProvider;
