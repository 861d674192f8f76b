//! Report upload.
//!
//! Accepts one multipart file, registers the job, queues it for
//! background processing, and returns immediately. Clients poll
//! `/status/{job_id}` for the outcome.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::extract::is_allowed_extension;
use crate::jobs::QueuedJob;
use crate::models::Job;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::storage;

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::NoFile)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(|name| name.to_string()).unwrap_or_default();
        let data = field.bytes().await.map_err(|_| ApiError::NoFile)?;
        file = Some((filename, data));
        break;
    }

    let (filename, data) = file.ok_or(ApiError::NoFile)?;
    if filename.is_empty() {
        return Err(ApiError::EmptyFilename);
    }

    let extension = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return Err(ApiError::InvalidFileType),
    };
    if !is_allowed_extension(&extension) {
        return Err(ApiError::InvalidFileType);
    }
    if !content_matches_extension(&data, &extension) {
        return Err(ApiError::InvalidFileType);
    }

    let job_id = Uuid::new_v4().to_string();
    let path = storage::save_upload(&state.settings.uploads_dir, &job_id, &filename, &data)
        .map_err(|err| ApiError::Internal(format!("Failed to save upload: {}", err)))?;

    state.jobs.create(Job::new(job_id.clone())).await;

    let queued = QueuedJob {
        job_id: job_id.clone(),
        file_path: path,
        filename: filename.clone(),
        extension,
    };
    if state.queue.dispatch(queued).is_err() {
        // The job record must still reach a terminal state for pollers.
        state
            .jobs
            .mark_error(&job_id, "Server is at capacity, try again later")
            .await;
        return Err(ApiError::Busy);
    }

    tracing::info!("Accepted {} as job {}", filename, job_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "job_id": job_id,
            "status": "processing",
        })),
    ))
}

/// Sniff the payload and reject uploads whose bytes contradict their name.
/// Unknown payloads pass; the extraction step is the real gate.
fn content_matches_extension(data: &[u8], extension: &str) -> bool {
    let Some(kind) = infer::get(data) else {
        return true;
    };

    match extension {
        "pdf" => kind.mime_type() == "application/pdf",
        "png" => kind.mime_type() == "image/png",
        "jpg" | "jpeg" => kind.mime_type() == "image/jpeg",
        _ => false,
    }
}
