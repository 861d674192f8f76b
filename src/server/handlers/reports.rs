//! Report retrieval and account attachment.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;

use crate::models::Report;
use crate::server::error::ApiError;
use crate::server::session::CurrentUser;
use crate::server::AppState;

/// GET /report/{report_id}
///
/// Only the owner sees the report; everyone else gets the same 403
/// whether or not the id exists.
pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(report_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state
        .db
        .reports()
        .get_owned(report_id, user.user_id)
        .await?
        .ok_or(ApiError::Forbidden)?;

    Ok(Json(report_body(&report)))
}

/// GET /public/report/{public_id}
///
/// Serves anonymous reports only. Attached reports disappear from this
/// route; expired ones answer 410 until someone claims them.
pub async fn public_report(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state
        .db
        .reports()
        .get_anonymous_by_public_id(&public_id)
        .await?
        .ok_or(ApiError::ReportNotFound)?;

    if report.is_expired(Utc::now()) {
        return Err(ApiError::ReportExpired);
    }

    Ok(Json(report_body(&report)))
}

/// GET /my-reports
pub async fn my_reports(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reports = state.db.reports().list_by_user(user.user_id).await?;

    let items: Vec<serde_json::Value> = reports
        .iter()
        .map(|report| {
            json!({
                "id": report.id,
                "filename": report.filename,
                "created_at": report.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(Json(json!(items)))
}

/// POST /report/{report_id}/attach
///
/// Claims an anonymous report for the calling account and clears its
/// expiry. Works exactly once per report; an expired link is still
/// claimable.
pub async fn attach_report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(report_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let claimed = state
        .db
        .reports()
        .attach_to_user(report_id, user.user_id)
        .await?;

    if !claimed {
        return Err(ApiError::AlreadyClaimed);
    }

    tracing::info!("Report {} attached to user {}", report_id, user.user_id);

    Ok(Json(json!({ "message": "Report saved successfully" })))
}

fn report_body(report: &Report) -> serde_json::Value {
    json!({
        "id": report.id,
        "filename": report.filename,
        "summary": report.summary,
        "created_at": report.created_at.to_rfc3339(),
    })
}
