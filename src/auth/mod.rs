use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod error;
pub mod events;
pub mod extractors;
pub mod handlers;
pub mod jwt;
#[cfg(test)]
pub(crate) mod memory;
pub mod password;
pub mod refresh;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use claims::{AccessClaims, Identity};
pub use error::AuthError;
pub use services::{AuthService, TokenPair};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
