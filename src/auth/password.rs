use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::{auth::error::HashError, config::PasswordConfig};

/// Argon2id hasher producing PHC strings.
///
/// Hashing and verification run on tokio's blocking pool so a slow hash never
/// holds up the worker threads serving other requests.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // Digest of a throwaway secret, verified against when the username is
    // unknown so both login failures cost one full verify.
    dummy_digest: String,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, HashError> {
        let or_default = |v: u32, d: u32| if v == 0 { d } else { v };
        let params = Params::new(
            or_default(cfg.memory_kib, Params::DEFAULT_M_COST),
            or_default(cfg.iterations, Params::DEFAULT_T_COST),
            or_default(cfg.parallelism, Params::DEFAULT_P_COST),
            None,
        )
        .map_err(|e| HashError(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_digest = hash_with(&argon2, "unknown-user-placeholder")?;
        Ok(Self {
            argon2,
            dummy_digest,
        })
    }

    pub async fn hash(&self, plain: &str) -> Result<String, HashError> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || hash_with(&argon2, &plain))
            .await
            .map_err(|e| HashError(format!("hash task join error: {e}")))?
    }

    /// Cost parameters are read from the digest, so hashes made under an
    /// older work factor still verify.
    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashError> {
        let argon2 = self.argon2.clone();
        let plain = plain.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_with(&argon2, &plain, &hash))
            .await
            .map_err(|e| HashError(format!("verify task join error: {e}")))?
    }

    /// Spends the same work as a real verify; the outcome is discarded.
    pub async fn verify_unknown_user(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_digest).await;
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            HashError(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_with(argon2: &Argon2<'_>, plain: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        HashError(e.to_string())
    })?;
    Ok(argon2.verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
