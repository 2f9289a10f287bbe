//! Identity and access management: authenticate credentials, issue session
//! tokens, and authorize bearer tokens against live sessions.
//!
//! The token is only a signed reference to a session id. [`Iam::authorize`]
//! always resolves the session from the store and decides expiry from the
//! stored `expires_at`, so the subject it returns is the stored one.

mod credentials;
mod error;
mod token;

pub use credentials::{hash_password, BcryptVerifier, CredentialVerifier};
pub use error::{CredentialError, IamError, TokenError};
pub use token::{Claims, JwtCodec, TokenCodec};

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use crate::db::{SessionStore, StoreError};
use crate::models::{Credential, Session, User};

static BEARER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Bearer\s+(\S+)").expect("valid regex"));

#[derive(Clone)]
pub struct Iam {
    credentials: Arc<dyn CredentialVerifier>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenCodec>,
}

impl Iam {
    pub fn new(
        credentials: Arc<dyn CredentialVerifier>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            tokens,
        }
    }

    pub async fn authenticate(&self, credential: &Credential) -> Result<User, IamError> {
        self.credentials
            .authenticate(credential)
            .await
            .map_err(IamError::Authenticate)
    }

    /// Opens a session for `user` and returns its signed token.
    pub async fn login(&self, user: &User) -> Result<String, IamError> {
        let session = self
            .sessions
            .create(&user.subject())
            .await
            .map_err(IamError::SessionCreation)?;
        debug!(session_id = session.id, sub = %session.subject, "session opened");
        self.tokens.encode(&session).map_err(IamError::Signing)
    }

    /// Resolves the raw `Authorization` header value to an active session.
    pub async fn authorize(&self, header: Option<&str>) -> Result<Session, IamError> {
        let token = bearer_token(header)?;
        let claims = self
            .tokens
            .decode(token)
            .map_err(IamError::AuthorizationFailed)?;

        let session = self.sessions.find(claims.sid).await.map_err(|e| match e {
            StoreError::NotFound => IamError::SessionNotFound(claims.sid),
            other => IamError::SessionLookup(other),
        })?;

        if !session.is_active_at(Utc::now()) {
            return Err(IamError::SessionExpired(session.id));
        }
        Ok(session)
    }
}

/// Extracts `<token>` from a `Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, IamError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(IamError::MissingToken),
    };
    BEARER
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(IamError::MalformedHeader)
}
