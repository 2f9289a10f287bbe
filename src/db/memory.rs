//! In-process stores with the same contracts as the Postgres ones. Used by tests and local runs.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{IdentityStore, SessionStore, StoreError, StoreResult};
use crate::models::{Session, User};

#[derive(Default, Clone)]
pub struct MemoryIdentityStore {
    users: Arc<RwLock<HashMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user as-is, keeping its id. Replaces any user with the same id.
    pub async fn insert(&self, user: User) {
        self.next_id.fetch_max(user.id, Ordering::SeqCst);
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_login(&self, login: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.login == login)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.login == login) {
            return Err(StoreError::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }
}

#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<u64, Session>>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            next_id: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, subject: &str) -> StoreResult<Session> {
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| StoreError::Internal(format!("session ttl {} overflows", self.ttl)))?;
        let session = Session {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            subject: subject.to_string(),
            created_at,
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find(&self, id: u64) -> StoreResult<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_expiry_is_created_plus_ttl() {
        let store = MemorySessionStore::new(Duration::minutes(30));
        let first = store.create("7").await.unwrap();
        let second = store.create("7").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.expires_at, first.created_at + Duration::minutes(30));
        assert_eq!(store.find(first.id).await.unwrap(), first);
        assert!(matches!(store.find(999).await, Err(StoreError::NotFound)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn overflowing_ttl_is_an_internal_error() {
        let store = MemorySessionStore::new(Duration::milliseconds(i64::MAX));
        assert!(matches!(
            store.create("7").await,
            Err(StoreError::Internal(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn identity_create_rejects_taken_login() {
        let store = MemoryIdentityStore::new();
        store
            .insert(User {
                id: 7,
                login: "alice".to_string(),
                password_hash: "x".to_string(),
                created_at: Utc::now(),
            })
            .await;

        assert!(matches!(
            store.create("alice", "y").await,
            Err(StoreError::Conflict)
        ));
        let bob = store.create("bob", "y").await.unwrap();
        assert_eq!(bob.id, 8);
        assert_eq!(store.find_by_login("bob").await.unwrap().id, 8);
        assert_eq!(store.find_by_id(7).await.unwrap().login, "alice");
        assert!(matches!(
            store.find_by_login("carol").await,
            Err(StoreError::NotFound)
        ));
    }
}
