//! Account identity and login credential.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A registered account. `password_hash` is always a bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Subject string embedded in sessions and tokens for this account.
    pub fn subject(&self) -> String {
        self.id.to_string()
    }
}

/// Login/password pair as received from a client. The password is plaintext in transit only.
#[derive(Clone)]
pub struct Credential {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}
