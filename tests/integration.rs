//! Integration tests against Postgres: register, login, protected route, and
//! the session store contract.
//!
//! Run with `cargo test`. Tests that need a database are skipped unless
//! `TEST_DATABASE_URL` points at a Postgres instance; the schema from
//! `migrations/` is applied on startup.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use portal::db::{self, DbPool, PgIdentityStore, PgSessionStore, SessionStore, StoreError};
use portal::iam::{BcryptVerifier, Iam, JwtCodec};
use portal::{create_app, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

const SCHEMA: &str = include_str!("../migrations/0001_create_users_and_sessions.sql");
const DEADLINE: std::time::Duration = std::time::Duration::from_secs(5);

async fn test_pool() -> Option<DbPool> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return None;
        }
    };
    let pool = match db::create_pool(&database_url, DEADLINE).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return None;
        }
    };
    for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    Some(pool)
}

fn test_state(pool: DbPool, ttl: Duration) -> AppState {
    let identities = Arc::new(PgIdentityStore::new(pool.clone(), DEADLINE));
    let iam = Iam::new(
        Arc::new(BcryptVerifier::new(identities.clone())),
        Arc::new(PgSessionStore::new(pool, ttl, DEADLINE)),
        Arc::new(JwtCodec::new("test-jwt-secret-min-32-chars!!")),
    );
    AppState::new(iam, identities)
}

fn unique_login() -> String {
    format!(
        "user-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

#[tokio::test]
async fn register_login_and_me() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let app = create_app(test_state(pool, Duration::minutes(60))).unwrap();

    let login = unique_login();
    let body = serde_json::json!({ "login": login, "password": "password123" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/user/register")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK, "register should succeed");

    let req = Request::builder()
        .method("POST")
        .uri("/api/user/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    let authorization = res
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .expect("login response should carry a token")
        .to_string();

    let req = Request::builder()
        .uri("/api/user/me")
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.get("login").and_then(|v| v.as_str()), Some(login.as_str()));
}

#[tokio::test]
async fn session_store_keeps_exact_ttl() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgSessionStore::new(pool, Duration::minutes(15), DEADLINE);

    let created = store.create("42").await.unwrap();
    assert_eq!(created.expires_at, created.created_at + Duration::minutes(15));

    let found = store.find(created.id).await.unwrap();
    assert_eq!(found, created);

    assert!(matches!(
        store.find(u64::MAX).await,
        Err(StoreError::NotFound)
    ));
}
