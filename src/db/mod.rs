//! Database layer: pool, storage seams, and their Postgres and in-memory backends.

mod memory;
mod pool;
mod repositories;

pub use memory::{MemoryIdentityStore, MemorySessionStore};
pub use pool::{create_pool, DbPool};
pub use repositories::{PgIdentityStore, PgSessionStore};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Session, User};

/// Failures reported by the identity and session stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("storage deadline exceeded")]
    DeadlineExceeded,

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("storage internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Account lookup and creation.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Exact-match lookup by login.
    async fn find_by_login(&self, login: &str) -> StoreResult<User>;

    async fn find_by_id(&self, id: i64) -> StoreResult<User>;

    /// Fails with [`StoreError::Conflict`] when the login is taken.
    async fn create(&self, login: &str, password_hash: &str) -> StoreResult<User>;
}

/// Session persistence. Sessions are insert-only; expiry is checked by the reader.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session for `subject` with `expires_at = created_at + ttl`.
    async fn create(&self, subject: &str) -> StoreResult<Session>;

    async fn find(&self, id: u64) -> StoreResult<Session>;
}

/// Runs a storage call under `deadline`, mapping expiry to [`StoreError::DeadlineExceeded`].
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| StoreError::DeadlineExceeded)?
}
