//! Bearer-token authentication for account routes.
//!
//! Tokens are opaque; only their SHA-256 hash is stored, so validation is
//! a hash and a single session lookup.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::auth;
use crate::server::error::ApiError;
use crate::server::AppState;

/// Authenticated caller, inserted into request extensions once the bearer
/// token has been validated.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i64,
}

/// Middleware guarding the account routes.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    match authenticate(&state, header.as_deref()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

async fn authenticate(state: &AppState, header: Option<&str>) -> Result<CurrentUser, ApiError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let session = state
        .db
        .sessions()
        .get_by_token_hash(&auth::hash_token(token))
        .await?
        .ok_or(ApiError::InvalidToken)?;

    if session.is_expired(Utc::now()) {
        return Err(ApiError::TokenExpired);
    }

    Ok(CurrentUser {
        user_id: session.user_id,
    })
}
