use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::Identity, error::AuthError, services::AuthService};

/// Verifies the bearer access token and hands the caller's identity to the
/// handler. Rejects with 401 on a missing header, another scheme, or a token
/// that fails verification.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("authorization header missing");
                AuthError::InvalidToken
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AuthError::InvalidToken)?;

        let service = Arc::<AuthService>::from_ref(state);
        let identity = service
            .verify_access_token(token.trim())
            .inspect_err(|_| warn!("invalid or expired access token"))?;

        Ok(AuthUser(identity))
    }
}
