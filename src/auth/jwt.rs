use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::AccessClaims, error::TokenError},
    config::JwtConfig,
};

/// Signs and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenCodec {
    pub fn new(cfg: &JwtConfig) -> Self {
        // Expiry is checked against the caller's clock below, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn issue_access_token(
        &self,
        user_id: i64,
        username: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims {
            user_id,
            username: username.to_string(),
            issued_at: now.unix_timestamp(),
            expires_at: (now + self.access_ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, "access token signed");
        Ok(token)
    }

    pub fn verify_access_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.expires_at <= now.unix_timestamp() {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }
}
