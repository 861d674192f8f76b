//! HTTP error responses.
//!
//! Every error surfaced to a client maps to a status code and a JSON body
//! of the form `{"error": "..."}`. Internal failures keep their detail in
//! the server log and return a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::repository::DieselError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Empty filename")]
    EmptyFilename,

    #[error("Invalid file type. Only PDF, PNG, JPG, and JPEG are allowed.")]
    InvalidFileType,

    #[error("Missing fields")]
    MissingFields,

    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable bearer token on a protected route.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    /// The report exists but belongs to someone else. The body matches
    /// [`ApiError::Unauthorized`] so the response does not reveal whether
    /// the report id is real.
    #[error("Unauthorized")]
    Forbidden,

    #[error("Invalid job id")]
    UnknownJob,

    #[error("Report not found")]
    ReportNotFound,

    #[error("This report has expired")]
    ReportExpired,

    #[error("Report not found or already saved")]
    AlreadyClaimed,

    #[error("Server is at capacity, try again later")]
    Busy,

    /// Unexpected failure. The string is logged, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile
            | ApiError::EmptyFilename
            | ApiError::InvalidFileType
            | ApiError::MissingFields
            | ApiError::AlreadyClaimed => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::Unauthorized
            | ApiError::TokenExpired
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UnknownJob | ApiError::ReportNotFound => StatusCode::NOT_FOUND,
            ApiError::EmailExists => StatusCode::CONFLICT,
            ApiError::ReportExpired => StatusCode::GONE,
            ApiError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }

        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let response = ApiError::UnknownJob.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body["error"], "Invalid job id");
    }

    #[tokio::test]
    async fn internal_detail_is_not_sent_to_the_client() {
        let response = ApiError::Internal("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn status_codes_match_the_wire_contract() {
        assert_eq!(
            ApiError::EmailExists.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::TokenExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::ReportExpired.into_response().status(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiError::Busy.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
