//! Job status polling.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::server::error::ApiError;
use crate::server::AppState;

/// GET /status/{job_id}
///
/// Terminal jobs keep answering with the same payload on every poll.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job = state.jobs.get(&job_id).await.ok_or(ApiError::UnknownJob)?;

    Ok(Json(json!({
        "status": job.status,
        "report_id": job.report_id,
        "public_id": job.public_id,
        "error": job.error,
    })))
}
