//! In-process store backends for tests, including ones that always fail.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::auth::{
    error::StoreError,
    repo::{CredentialStore, RefreshTokenRepo},
    repo_types::{RefreshToken, User},
};

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<i64, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict);
        }
        let id = users.len() as i64 + 1;
        users.push(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: email.to_string(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        let users = self.users.lock().await;
        users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        let users = self.users.lock().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokenRepo {
    tokens: Mutex<HashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenRepo {
    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }
}

#[async_trait]
impl RefreshTokenRepo for MemoryRefreshTokenRepo {
    async fn insert(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().await;
        if tokens.contains_key(&token.token) {
            return Err(StoreError::Conflict);
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<i64>, StoreError> {
        let tokens = self.tokens.lock().await;
        Ok(tokens
            .get(token)
            .filter(|t| t.expires_at > now)
            .map(|t| t.user_id))
    }
}

/// Credential backend whose every call fails as if the pool were exhausted.
pub struct FailingCredentialStore;

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn create(&self, _username: &str, _hash: &str, _email: &str) -> Result<i64, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_username(&self, _username: &str) -> Result<User, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_id(&self, _id: i64) -> Result<User, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }
}

pub struct FailingRefreshTokenRepo;

#[async_trait]
impl RefreshTokenRepo for FailingRefreshTokenRepo {
    async fn insert(&self, _token: &RefreshToken) -> Result<(), StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn find_active(&self, _token: &str, _now: OffsetDateTime) -> Result<Option<i64>, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryCredentialStore::default();
        let id = store.create("alice", "h", "alice@x.com").await.unwrap();
        assert_eq!(store.find_by_id(id).await.unwrap().username, "alice");
        assert!(matches!(
            store.create("alice", "h2", "other@x.com").await,
            Err(StoreError::Conflict)
        ));
        assert!(matches!(
            store.find_by_username("bob").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn find_active_respects_expiry() {
        let repo = MemoryRefreshTokenRepo::default();
        let now = OffsetDateTime::from_unix_timestamp(1_000).unwrap();
        repo.insert(&RefreshToken {
            token: "t".into(),
            user_id: 3,
            expires_at: now + Duration::seconds(10),
        })
        .await
        .unwrap();
        assert_eq!(repo.find_active("t", now).await.unwrap(), Some(3));
        assert_eq!(
            repo.find_active("t", now + Duration::seconds(10)).await.unwrap(),
            None
        );
        assert_eq!(repo.find_active("missing", now).await.unwrap(), None);
    }
}
