//! HTTP request handlers.

pub mod auth;
pub mod reports;
pub mod status;
pub mod upload;

use axum::Json;

/// GET /ping
pub async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Backend is working!" }))
}
