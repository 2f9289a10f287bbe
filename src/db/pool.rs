//! PostgreSQL connection pool.

use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub type DbPool = sqlx::PgPool;

/// Connects eagerly so a bad `DATABASE_URL` fails at startup. Acquiring a
/// connection shares the storage deadline.
pub async fn create_pool(database_url: &str, deadline: Duration) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(deadline)
        .connect(database_url)
        .await
}
