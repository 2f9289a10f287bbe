//! Postgres-backed identity and session stores.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::FromRow;
use tracing::debug;

use super::{with_deadline, DbPool, IdentityStore, SessionStore, StoreError, StoreResult};
use crate::models::{Session, User};

// ---- Users ----

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: DbPool,
    deadline: std::time::Duration,
}

impl PgIdentityStore {
    pub fn new(pool: DbPool, deadline: std::time::Duration) -> Self {
        Self { pool, deadline }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_login(&self, login: &str) -> StoreResult<User> {
        with_deadline(self.deadline, async {
            sqlx::query_as::<_, User>(
                "SELECT id, login, password_hash, created_at FROM users WHERE login = $1 LIMIT 1",
            )
            .bind(login)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        with_deadline(self.deadline, async {
            sqlx::query_as::<_, User>(
                "SELECT id, login, password_hash, created_at FROM users WHERE id = $1 LIMIT 1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn create(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        debug!(login = %login, "create user");
        with_deadline(self.deadline, async {
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (login, password_hash)
                VALUES ($1, $2)
                ON CONFLICT (login) DO NOTHING
                RETURNING id, login, password_hash, created_at
                "#,
            )
            .bind(login)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::Conflict)
        })
        .await
    }
}

// ---- Sessions ----

#[derive(Debug, FromRow)]
struct SessionRow {
    id: i64,
    sub: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| StoreError::Internal(format!("negative session id {}", row.id)))?;
        Ok(Session {
            id,
            subject: row.sub,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
    ttl: Duration,
    deadline: std::time::Duration,
}

impl PgSessionStore {
    pub fn new(pool: DbPool, ttl: Duration, deadline: std::time::Duration) -> Self {
        Self {
            pool,
            ttl,
            deadline,
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, subject: &str) -> StoreResult<Session> {
        // timestamptz keeps microseconds; truncate so the stored pair stays exactly `ttl` apart.
        let created_at = Utc::now().trunc_subsecs(6);
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| StoreError::Internal(format!("session ttl {} overflows", self.ttl)))?;

        let row = with_deadline(self.deadline, async {
            let row = sqlx::query_as::<_, SessionRow>(
                r#"
                INSERT INTO sessions (sub, created_at, expires_at)
                VALUES ($1, $2, $3)
                RETURNING id, sub, created_at, expires_at
                "#,
            )
            .bind(subject)
            .bind(created_at)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await?;
            Ok::<_, StoreError>(row)
        })
        .await?;

        debug!(session_id = row.id, sub = %row.sub, "create session");
        Session::try_from(row)
    }

    async fn find(&self, id: u64) -> StoreResult<Session> {
        let Ok(id) = i64::try_from(id) else {
            return Err(StoreError::NotFound);
        };

        let row = with_deadline(self.deadline, async {
            sqlx::query_as::<_, SessionRow>(
                "SELECT id, sub, created_at, expires_at FROM sessions WHERE id = $1 LIMIT 1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await?;

        Session::try_from(row)
    }
}
