use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::Identity,
        error::{AuthError, StoreError},
        events::{AuthEvent, AuthObserver},
        jwt::TokenCodec,
        password::PasswordHasher,
        refresh::RefreshTokens,
        repo::{CredentialStore, RefreshTokenRepo},
    },
    clock::Clock,
    config::JwtConfig,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Register, login, refresh and access-token verification.
///
/// Holds no per-session state; every call reads the stores afresh, so one
/// instance is shared across all request tasks.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    refresh_tokens: RefreshTokens,
    hasher: PasswordHasher,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn AuthObserver>,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        refresh_repo: Arc<dyn RefreshTokenRepo>,
        hasher: PasswordHasher,
        jwt: &JwtConfig,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn AuthObserver>,
    ) -> Self {
        Self {
            credentials,
            refresh_tokens: RefreshTokens::new(
                refresh_repo,
                Duration::minutes(jwt.refresh_ttl_minutes),
            ),
            hasher,
            codec: TokenCodec::new(jwt),
            clock,
            observer,
        }
    }

    #[instrument(skip(self, password, email))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<i64, AuthError> {
        let email = email.trim();
        if username.trim().is_empty() {
            return Err(AuthError::Validation("username is required".into()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }
        if !is_valid_email(email) {
            return Err(AuthError::Validation("invalid email".into()));
        }

        let hash = self.hasher.hash(password).await?;
        let user_id = match self.credentials.create(username, &hash, email).await {
            Ok(id) => id,
            Err(StoreError::Conflict) => {
                warn!("username already registered");
                return Err(AuthError::Conflict);
            }
            Err(e) => return Err(AuthError::Store(e)),
        };

        info!(user_id, "user registered");
        self.observer
            .record(AuthEvent::CredentialRegistered { user_id });
        Ok(user_id)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.credentials.find_by_username(username).await {
            Ok(u) => u,
            Err(StoreError::NotFound) => {
                self.hasher.verify_unknown_user(password).await;
                warn!("login unknown username");
                self.observer.record(AuthEvent::LoginFailed);
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Store(e)),
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            warn!(user_id = user.id, "login invalid password");
            self.observer.record(AuthEvent::LoginFailed);
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let access_token = self.codec.issue_access_token(user.id, &user.username, now)?;
        let refresh_token = self.refresh_tokens.issue(user.id, now).await?;

        info!(user_id = user.id, "user logged in");
        self.observer
            .record(AuthEvent::LoginSucceeded { user_id: user.id });
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mints a new access token. The refresh token stays valid until it expires.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let user_id = self.refresh_tokens.validate(refresh_token, now).await?;

        let user = match self.credentials.find_by_id(user_id).await {
            Ok(u) => u,
            Err(StoreError::NotFound) => {
                warn!(user_id, "refresh token owner missing");
                return Err(AuthError::InvalidOrExpiredToken);
            }
            Err(e) => return Err(AuthError::Store(e)),
        };

        let access_token = self.codec.issue_access_token(user.id, &user.username, now)?;
        info!(user_id, "token refreshed");
        self.observer.record(AuthEvent::TokenRefreshed { user_id });
        Ok(access_token)
    }

    /// Pure check of signature and expiry; never touches a store.
    pub fn verify_access_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.verify_access_token(token, self.clock.now())?;
        Ok(claims.into())
    }
}
