//! Job state storage.
//!
//! Jobs live only for the lifetime of the process; clients that lose a job id
//! re-upload. The store is behind a trait so the server wiring does not care
//! whether state sits in a process-local map or somewhere shared.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{Job, JobStatus};

/// Storage for in-flight and finished jobs.
///
/// Each job id has exactly one writer (the runner that processes it), so
/// terminal transitions never race for the same id. A transition on an
/// already-terminal job is ignored; the first terminal state wins.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a fresh job in `processing` state.
    async fn create(&self, job: Job);

    /// Fetch the current state of a job.
    async fn get(&self, job_id: &str) -> Option<Job>;

    /// Transition a job to `done`, recording the stored report.
    async fn mark_done(&self, job_id: &str, report_id: i64, public_id: &str);

    /// Transition a job to `error` with a human-readable message.
    async fn mark_error(&self, job_id: &str, message: &str);
}

/// Process-local job store over a lock-guarded map.
#[derive(Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: Job) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job);
    }

    async fn get(&self, job_id: &str) -> Option<Job> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id).cloned()
    }

    async fn mark_done(&self, job_id: &str, report_id: i64, public_id: &str) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            Some(job) if job.is_terminal() => {
                tracing::warn!(
                    "Ignoring done transition for terminal job {} ({})",
                    job_id,
                    job.status.as_str()
                );
            }
            Some(job) => {
                job.status = JobStatus::Done;
                job.report_id = Some(report_id);
                job.public_id = Some(public_id.to_string());
                job.updated_at = Utc::now();
            }
            None => {
                tracing::warn!("Ignoring done transition for unknown job {}", job_id);
            }
        }
    }

    async fn mark_error(&self, job_id: &str, message: &str) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            Some(job) if job.is_terminal() => {
                tracing::warn!(
                    "Ignoring error transition for terminal job {} ({})",
                    job_id,
                    job.status.as_str()
                );
            }
            Some(job) => {
                job.status = JobStatus::Error;
                job.error = Some(message.to_string());
                job.updated_at = Utc::now();
            }
            None => {
                tracing::warn!("Ignoring error transition for unknown job {}", job_id);
            }
        }
    }
}
