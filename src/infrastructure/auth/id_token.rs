//! ID token verification and token-backed actor provider

use std::fmt::Debug;
use std::sync::RwLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::auth::{ActorId, ActorProvider};
use crate::domain::DomainError;

/// Claims carried by an identity provider's ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl IdTokenClaims {
    pub fn new(actor: &ActorId, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: actor.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// HS256 ID token issuer and verifier
#[derive(Clone)]
pub struct IdTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for IdTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl IdTokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for an actor
    pub fn issue(&self, actor: &ActorId, expiration_hours: u64) -> Result<String, DomainError> {
        let claims = IdTokenClaims::new(actor, expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to issue ID token: {}", e)))
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> Result<IdTokenClaims, DomainError> {
        decode::<IdTokenClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| DomainError::auth_required(format!("Invalid ID token: {}", e)))
    }
}

/// Actor provider backed by the current ID token
///
/// The token is re-verified on every lookup, so an expired token means
/// nobody is signed in.
#[derive(Debug)]
pub struct TokenActorProvider {
    tokens: IdTokenService,
    token: RwLock<Option<String>>,
}

impl TokenActorProvider {
    pub fn new(tokens: IdTokenService) -> Self {
        Self {
            tokens,
            token: RwLock::new(None),
        }
    }

    /// Verify and adopt a token, returning the actor it identifies
    pub fn sign_in(&self, token: impl Into<String>) -> Result<ActorId, DomainError> {
        let token = token.into();
        let claims = self.tokens.verify(&token)?;

        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(ActorId::new(claims.sub))
    }

    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl ActorProvider for TokenActorProvider {
    fn current_actor(&self) -> Option<ActorId> {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        let token = guard.as_deref()?;

        match self.tokens.verify(token) {
            Ok(claims) => Some(ActorId::new(claims.sub)),
            Err(e) => {
                debug!(error = %e, "Stored ID token no longer valid");
                None
            }
        }
    }
}
