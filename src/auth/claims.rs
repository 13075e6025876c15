use serde::{Deserialize, Serialize};

/// Access-token payload. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Caller identity recovered from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<AccessClaims> for Identity {
    fn from(c: AccessClaims) -> Self {
        Self {
            user_id: c.user_id,
            username: c.username,
        }
    }
}
