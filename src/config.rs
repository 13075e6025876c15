use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Argon2 work factor. Zero values fall back to the argon2 crate defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .context("DATABASE_URL is required")?;
        let secret = var("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .context("JWT_SECRET is required")?;

        let parsed = |key: &str, default: i64| {
            var(key)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        let jwt = JwtConfig {
            secret,
            ttl_minutes: parsed("JWT_TTL_MINUTES", 15),
            refresh_ttl_minutes: parsed("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 7),
        };

        let work = |key: &str| var(key).and_then(|v| v.parse::<u32>().ok()).unwrap_or(0);
        let password = PasswordConfig {
            memory_kib: work("PASSWORD_HASH_MEMORY_KIB"),
            iterations: work("PASSWORD_HASH_ITERATIONS"),
            parallelism: work("PASSWORD_HASH_PARALLELISM"),
        };

        let port = match var("APP_PORT") {
            Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
            password,
        })
    }
}
