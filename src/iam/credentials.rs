//! Password hashing and credential verification (bcrypt).

use async_trait::async_trait;
use std::sync::Arc;

use super::CredentialError;
use crate::db::{IdentityStore, StoreError};
use crate::models::{Credential, User};

const HASH_COST: u32 = 10;

/// Checks a login/password pair against stored identities.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn authenticate(&self, credential: &Credential) -> Result<User, CredentialError>;
}

#[derive(Clone)]
pub struct BcryptVerifier {
    identities: Arc<dyn IdentityStore>,
}

impl BcryptVerifier {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }
}

#[async_trait]
impl CredentialVerifier for BcryptVerifier {
    async fn authenticate(&self, credential: &Credential) -> Result<User, CredentialError> {
        let user = self
            .identities
            .find_by_login(&credential.login)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CredentialError::NotFound,
                other => CredentialError::Store(other),
            })?;

        if !verify_password(&credential.password, &user.password_hash).await? {
            return Err(CredentialError::InvalidCredentials);
        }
        Ok(user)
    }
}

/// Hashes `password` with a fresh salt. Runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, CredentialError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| CredentialError::Internal(format!("hash task: {}", e)))?
        .map_err(|e| CredentialError::Internal(format!("hash: {}", e)))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| CredentialError::Internal(format!("verify task: {}", e)))?
        .map_err(|e| CredentialError::Internal(format!("parse hash: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryIdentityStore;
    use chrono::Utc;

    async fn verifier_with(login: &str, password_hash: &str) -> BcryptVerifier {
        let store = MemoryIdentityStore::new();
        store
            .insert(User {
                id: 7,
                login: login.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            })
            .await;
        BcryptVerifier::new(Arc::new(store))
    }

    fn credential(login: &str, password: &str) -> Credential {
        Credential {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn hash_and_verify_password() {
        let hash = hash_password("mypassword").await.unwrap();
        assert_ne!(hash, "mypassword");
        assert!(verify_password("mypassword", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn authenticates_matching_password() {
        let verifier = verifier_with("alice", &bcrypt::hash("secret", 4).unwrap()).await;
        let user = verifier
            .authenticate(&credential("alice", "secret"))
            .await
            .unwrap();
        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let verifier = verifier_with("alice", &bcrypt::hash("secret", 4).unwrap()).await;
        assert!(matches!(
            verifier.authenticate(&credential("alice", "guess")).await,
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_login_is_not_found() {
        let verifier = verifier_with("alice", &bcrypt::hash("secret", 4).unwrap()).await;
        assert!(matches!(
            verifier.authenticate(&credential("bob", "secret")).await,
            Err(CredentialError::NotFound)
        ));
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_internal() {
        let verifier = verifier_with("alice", "plaintext-oops").await;
        assert!(matches!(
            verifier.authenticate(&credential("alice", "secret")).await,
            Err(CredentialError::Internal(_))
        ));
    }
}
