//! Account signup and login.
//!
//! Both endpoints answer with a fresh bearer token. Sessions are stored
//! hashed and expire after the configured TTL.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::models::Session;
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::MissingFields);
    }
    if state.db.users().email_exists(&body.email).await? {
        return Err(ApiError::EmailExists);
    }

    let password_hash = auth::hash_password(&body.password);
    let user = state.db.users().create(&body.email, &password_hash).await?;
    let token = issue_session(&state, user.id).await?;

    tracing::info!("Created account {}", user.id);

    Ok(Json(json!({ "token": token, "user_id": user.id })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::MissingFields);
    }

    let user = state
        .db
        .users()
        .get_by_email(&body.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_session(&state, user.id).await?;

    Ok(Json(json!({ "token": token, "user_id": user.id })))
}

async fn issue_session(state: &AppState, user_id: i64) -> Result<String, ApiError> {
    let token = auth::generate_token();
    let session = Session::new(
        user_id,
        auth::hash_token(&token),
        state.settings.session_ttl_hours,
    );
    state.db.sessions().create(&session).await?;
    Ok(token)
}
