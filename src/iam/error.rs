//! Error taxonomy for credential checks, token handling and session authorization.

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("identity not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity lookup failed: {0}")]
    Store(#[source] StoreError),

    #[error("password hash error: {0}")]
    Internal(String),
}

/// IAM failures, each tagged with the operation that produced it.
#[derive(Debug, Error)]
pub enum IamError {
    #[error("authenticate: {0}")]
    Authenticate(#[source] CredentialError),

    #[error("login: session creation failed: {0}")]
    SessionCreation(#[source] StoreError),

    #[error("login: {0}")]
    Signing(#[source] TokenError),

    #[error("authorize: authorization header is missing")]
    MissingToken,

    #[error("authorize: no bearer token in authorization header")]
    MalformedHeader,

    #[error("authorize: {0}")]
    AuthorizationFailed(#[source] TokenError),

    #[error("authorize: session {0} not found")]
    SessionNotFound(u64),

    #[error("authorize: session {0} expired")]
    SessionExpired(u64),

    #[error("authorize: session lookup failed: {0}")]
    SessionLookup(#[source] StoreError),
}

impl IamError {
    /// True when the failure is evidence of bad or stale credentials, as opposed
    /// to a storage or internal fault.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            IamError::Authenticate(e) => matches!(
                e,
                CredentialError::NotFound | CredentialError::InvalidCredentials
            ),
            IamError::MissingToken
            | IamError::MalformedHeader
            | IamError::AuthorizationFailed(_)
            | IamError::SessionNotFound(_)
            | IamError::SessionExpired(_) => true,
            IamError::SessionCreation(_) | IamError::Signing(_) | IamError::SessionLookup(_) => {
                false
            }
        }
    }
}
