//! Bounded job queue between the upload handler and the worker pool.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

/// One accepted upload waiting to be processed.
#[derive(Debug)]
pub struct QueuedJob {
    /// Job id handed back to the uploader.
    pub job_id: String,
    /// Where the upload was saved.
    pub file_path: PathBuf,
    /// Original filename, kept for the report record.
    pub filename: String,
    /// Validated lowercase extension the extractor dispatches on.
    pub extension: String,
}

/// Returned when the queue cannot take more work.
#[derive(Debug, Error)]
#[error("Job queue is full")]
pub struct QueueFull;

/// Sending half of the job queue, held by the upload handler.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<QueuedJob>,
}

impl JobQueue {
    /// Create a queue with the given capacity. The receiver goes to the
    /// worker pool.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueuedJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Hand a job to the workers without blocking the request.
    ///
    /// Fails when the queue is at capacity (or the workers have shut down),
    /// which is the backpressure signal for the upload handler.
    pub fn dispatch(&self, job: QueuedJob) -> Result<(), QueueFull> {
        self.tx.try_send(job).map_err(|e| {
            tracing::warn!("Could not queue job {}: {}", job_id_of(&e), e);
            QueueFull
        })
    }
}

fn job_id_of(err: &mpsc::error::TrySendError<QueuedJob>) -> &str {
    match err {
        mpsc::error::TrySendError::Full(job) => &job.job_id,
        mpsc::error::TrySendError::Closed(job) => &job.job_id,
    }
}
