use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string
    pub email: String,
    pub created_at: OffsetDateTime,
}

/// Stored refresh token; never updated after insert.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}
