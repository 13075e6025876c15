use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::{
    error::{AuthError, StoreError},
    repo::RefreshTokenRepo,
    repo_types::RefreshToken,
};

const TOKEN_BYTES: usize = 32;

/// Issues and validates opaque refresh tokens. Tokens are never rotated or
/// deleted; they stop working once `expires_at` passes.
#[derive(Clone)]
pub struct RefreshTokens {
    repo: Arc<dyn RefreshTokenRepo>,
    ttl: Duration,
}

impl RefreshTokens {
    pub fn new(repo: Arc<dyn RefreshTokenRepo>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    pub async fn issue(&self, user_id: i64, now: OffsetDateTime) -> Result<String, AuthError> {
        let record = RefreshToken {
            token: generate_token(),
            user_id,
            expires_at: now + self.ttl,
        };
        self.repo.insert(&record).await.map_err(AuthError::Store)?;
        debug!(user_id, expires_at = %record.expires_at, "refresh token stored");
        Ok(record.token)
    }

    /// Absent and expired tokens are the same error.
    pub async fn validate(&self, token: &str, now: OffsetDateTime) -> Result<i64, AuthError> {
        match self.repo.find_active(token, now).await {
            Ok(Some(user_id)) => Ok(user_id),
            Ok(None) => Err(AuthError::InvalidOrExpiredToken),
            Err(StoreError::NotFound) => Err(AuthError::InvalidOrExpiredToken),
            Err(e) => Err(AuthError::Store(e)),
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}
