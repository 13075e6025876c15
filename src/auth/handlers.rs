use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        claims::Identity,
        dto::{LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, RegisterResponse},
        error::AuthError,
        extractors::AuthUser,
        services::TokenPair,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            // The rejection text can quote body fields, so only the status is logged.
            warn!(status = %rejection.status(), "invalid request body");
            Err(AuthError::Validation("invalid request".into()))
        }
    }
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let req = body(payload)?;
    let user_id = state
        .auth
        .register(&req.username, &req.password, &req.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".into(),
            user_id,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, AuthError> {
    let req = body(payload)?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AuthError::Validation("username and password are required".into()));
    }
    let pair = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(pair))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let req = body(payload)?;
    if req.refresh_token.is_empty() {
        return Err(AuthError::Validation("refresh_token is required".into()));
    }
    let access_token = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(RefreshResponse { access_token }))
}

pub async fn get_me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use axum::{body::Body, extract::FromRequest, http::Request};

    use super::*;

    #[derive(Clone)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn malformed_body_is_logged_without_its_contents() {
        let req = Request::post("/login")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"alice","password":918273645}"#))
            .unwrap();
        let payload = Json::<LoginRequest>::from_request(req, &()).await;
        assert!(payload.is_err());

        let buf = LogBuffer(Arc::new(Mutex::new(Vec::new())));
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || body(payload));

        assert!(matches!(result, Err(AuthError::Validation(_))));
        let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("invalid request body"));
        assert!(!logged.contains("918273645"));
    }

    #[test]
    fn register_accepts_both_password_field_names() {
        let a: RegisterRequest = serde_json::from_str(
            r#"{"username":"alice","password_hash":"s3cret","email":"alice@x.com"}"#,
        )
        .unwrap();
        let b: RegisterRequest = serde_json::from_str(
            r#"{"username":"alice","password":"s3cret","email":"alice@x.com"}"#,
        )
        .unwrap();
        assert_eq!(a.password, "s3cret");
        assert_eq!(b.password, "s3cret");
    }

    #[test]
    fn identity_serialization() {
        let json = serde_json::to_string(&Identity {
            user_id: 3,
            username: "alice".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"user_id":3,"username":"alice"}"#);
    }
}
