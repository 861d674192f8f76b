//! Processing job models.
//!
//! A job tracks one uploaded document from acceptance through
//! summarization. Jobs are short-lived bookkeeping for the polling API;
//! the durable output is the report row they point at once done.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of an upload job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Whether this status is final. Terminal jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// A document processing job.
///
/// Created in `Processing` state when an upload is accepted, then moved
/// exactly once to `Done` (with the report ids) or `Error` (with a
/// client-safe message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier handed back to the uploader for polling.
    pub id: String,
    /// Current processing status.
    pub status: JobStatus,
    /// Database id of the finished report, set when done.
    pub report_id: Option<i64>,
    /// Public share id of the finished report, set when done.
    pub public_id: Option<String>,
    /// Client-safe failure description, set on error.
    pub error: Option<String>,
    /// When the job was accepted.
    pub created_at: DateTime<Utc>,
    /// When the job last changed state.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in the `Processing` state.
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Processing,
            report_id: None,
            public_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job has reached a final state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [JobStatus::Processing, JobStatus::Done, JobStatus::Error] {
            assert_eq!(JobStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::from_str("finished"), None);
    }

    #[test]
    fn test_new_job_is_processing() {
        let job = Job::new("abc".to_string());
        assert_eq!(job.status, JobStatus::Processing);
        assert!(!job.is_terminal());
        assert!(job.report_id.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }
}
