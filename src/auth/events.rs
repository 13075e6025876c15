use tracing::info;

/// Authentication outcomes reported to an [`AuthObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    CredentialRegistered { user_id: i64 },
    LoginSucceeded { user_id: i64 },
    LoginFailed,
    TokenRefreshed { user_id: i64 },
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::CredentialRegistered { .. } => "credential_registered",
            AuthEvent::LoginSucceeded { .. } => "login_succeeded",
            AuthEvent::LoginFailed => "login_failed",
            AuthEvent::TokenRefreshed { .. } => "token_refreshed",
        }
    }

    fn user_id(&self) -> Option<i64> {
        match self {
            AuthEvent::CredentialRegistered { user_id }
            | AuthEvent::LoginSucceeded { user_id }
            | AuthEvent::TokenRefreshed { user_id } => Some(*user_id),
            AuthEvent::LoginFailed => None,
        }
    }
}

pub trait AuthObserver: Send + Sync {
    fn record(&self, event: AuthEvent);
}

/// Writes each event to the structured log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl AuthObserver for LogObserver {
    fn record(&self, event: AuthEvent) {
        info!(event = event.name(), user_id = ?event.user_id(), "auth event");
    }
}

#[cfg(test)]
pub use recording::RecordingObserver;
