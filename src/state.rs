use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    auth::{
        events::LogObserver,
        password::PasswordHasher,
        repo::{PgCredentialStore, PgRefreshTokenRepo},
        AuthService,
    },
    clock::SystemClock,
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Production wiring: PostgreSQL stores, system clock, log observer.
    pub fn postgres(db: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.password)?;
        let auth = AuthService::new(
            Arc::new(PgCredentialStore::new(db.clone())),
            Arc::new(PgRefreshTokenRepo::new(db)),
            hasher,
            &config.jwt,
            Arc::new(SystemClock),
            Arc::new(LogObserver),
        );
        Ok(Self::from_service(Arc::new(auth)))
    }

    pub fn from_service(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
