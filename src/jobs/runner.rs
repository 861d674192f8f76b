//! Background job execution.
//!
//! The runner owns the extract, summarize, persist sequence for one job.
//! Failures never escape it: every path ends with exactly one terminal
//! transition on the job store, so polling clients always reach a verdict.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use super::queue::QueuedJob;
use super::store::JobStore;
use crate::extract::{Extract, ExtractionError};
use crate::llm::{Summarizer, SummaryError};
use crate::models::Report;
use crate::repository::{DieselError, ReportRepository};

#[derive(Debug, Error)]
enum ProcessError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Summary(#[from] SummaryError),

    #[error("Failed to store report: {0}")]
    Database(DieselError),

    #[error("Text extraction timed out")]
    Timeout,
}

impl ProcessError {
    /// Message stored on the job and surfaced to polling clients. Remote
    /// service responses and database detail stay in the logs only.
    fn client_message(&self) -> String {
        match self {
            ProcessError::Summary(SummaryError::Api(_)) => "Summary generation failed".to_string(),
            ProcessError::Summary(SummaryError::Connection(_)) => {
                "Summary service unreachable".to_string()
            }
            ProcessError::Database(_) => "Failed to store report".to_string(),
            other => other.to_string(),
        }
    }
}

/// Executes accepted jobs through extraction, summarization, and persistence.
#[derive(Clone)]
pub struct JobRunner {
    extractor: Arc<dyn Extract>,
    summarizer: Arc<dyn Summarizer>,
    reports: ReportRepository,
    store: Arc<dyn JobStore>,
    report_ttl_hours: i64,
    extract_timeout: Duration,
}

impl JobRunner {
    pub fn new(
        extractor: Arc<dyn Extract>,
        summarizer: Arc<dyn Summarizer>,
        reports: ReportRepository,
        store: Arc<dyn JobStore>,
        report_ttl_hours: i64,
        extract_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            reports,
            store,
            report_ttl_hours,
            extract_timeout,
        }
    }

    /// Run one job to a terminal state.
    pub async fn process(&self, job: QueuedJob) {
        tracing::info!("Processing job {} ({})", job.job_id, job.filename);

        match self.try_process(&job).await {
            Ok((report_id, public_id)) => {
                tracing::info!("Job {} done, report {}", job.job_id, report_id);
                self.store
                    .mark_done(&job.job_id, report_id, &public_id)
                    .await;
            }
            Err(e) => {
                tracing::warn!("Job {} failed: {}", job.job_id, e);
                self.store
                    .mark_error(&job.job_id, &e.client_message())
                    .await;
            }
        }
    }

    async fn try_process(&self, job: &QueuedJob) -> Result<(i64, String), ProcessError> {
        // Extraction shells out and blocks, so it runs on the blocking pool.
        // The timeout bounds how long the job waits, not the subprocesses
        // themselves; those exit on their own.
        let extractor = self.extractor.clone();
        let path = job.file_path.clone();
        let extension = job.extension.clone();
        let extract_task = tokio::task::spawn_blocking(move || extractor.extract(&path, &extension));

        let extraction = match timeout(self.extract_timeout, extract_task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(ExtractionError::ExtractionFailed(join_error.to_string()).into());
            }
            Err(_) => return Err(ProcessError::Timeout),
        };

        tracing::debug!(
            "Job {}: extracted {} chars via {:?}",
            job.job_id,
            extraction.text.chars().count(),
            extraction.method,
        );

        let summary = self.summarizer.summarize(&extraction.text).await?;

        let report = Report::new_anonymous(job.filename.clone(), summary, self.report_ttl_hours);
        self.reports
            .insert(&report)
            .await
            .map_err(ProcessError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::extract::{ExtractionMethod, ExtractionResult};
    use crate::jobs::store::MemoryJobStore;
    use crate::llm::{LlmClient, LlmConfig};
    use crate::models::{Job, JobStatus};
    use crate::repository::DbContext;

    struct FixedExtractor {
        text: String,
    }

    impl Extract for FixedExtractor {
        fn extract(
            &self,
            _path: &Path,
            _extension: &str,
        ) -> Result<ExtractionResult, ExtractionError> {
            Ok(ExtractionResult {
                text: self.text.clone(),
                method: ExtractionMethod::PdfText,
                page_count: Some(1),
            })
        }
    }

    struct FailingExtractor;

    impl Extract for FailingExtractor {
        fn extract(
            &self,
            _path: &Path,
            _extension: &str,
        ) -> Result<ExtractionResult, ExtractionError> {
            Err(ExtractionError::ExtractionFailed("tool crashed".to_string()))
        }
    }

    struct SlowExtractor;

    impl Extract for SlowExtractor {
        fn extract(
            &self,
            _path: &Path,
            _extension: &str,
        ) -> Result<ExtractionResult, ExtractionError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(ExtractionResult {
                text: "late".to_string(),
                method: ExtractionMethod::Ocr,
                page_count: Some(1),
            })
        }
    }

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
            Ok(format!("Summary of {} chars", text.chars().count()))
        }
    }

    async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }

    fn runner_with(
        ctx: &DbContext,
        extractor: Arc<dyn Extract>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<dyn JobStore>,
        extract_timeout: Duration,
    ) -> JobRunner {
        JobRunner::new(extractor, summarizer, ctx.reports(), store, 12, extract_timeout)
    }

    fn queued(id: &str) -> QueuedJob {
        QueuedJob {
            job_id: id.to_string(),
            file_path: PathBuf::from("/tmp/upload.pdf"),
            filename: "upload.pdf".to_string(),
            extension: "pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_job_persists_report_and_marks_done() {
        let (ctx, _dir) = setup_test_db().await;
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        store.create(Job::new("job-1".to_string())).await;

        let runner = runner_with(
            &ctx,
            Arc::new(FixedExtractor {
                text: "Hemoglobin 13.5 g/dL, within reference range.".to_string(),
            }),
            Arc::new(EchoSummarizer),
            store.clone(),
            Duration::from_secs(5),
        );
        runner.process(queued("job-1")).await;

        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert!(job.error.is_none());

        let report_id = job.report_id.unwrap();
        let report = ctx.reports().get(report_id).await.unwrap().unwrap();
        assert_eq!(report.filename, "upload.pdf");
        assert!(report.summary.starts_with("Summary of"));
        assert_eq!(job.public_id.as_deref(), Some(report.public_id.as_str()));
        assert!(report.is_anonymous());
        assert!(report.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_extraction_failure_marks_error() {
        let (ctx, _dir) = setup_test_db().await;
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        store.create(Job::new("job-1".to_string())).await;

        let runner = runner_with(
            &ctx,
            Arc::new(FailingExtractor),
            Arc::new(EchoSummarizer),
            store.clone(),
            Duration::from_secs(5),
        );
        runner.process(queued("job-1")).await;

        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error.unwrap().contains("Extraction failed"));
        assert!(job.report_id.is_none());
    }

    #[tokio::test]
    async fn test_empty_extraction_is_rejected_by_summarizer() {
        let (ctx, _dir) = setup_test_db().await;
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        store.create(Job::new("job-1".to_string())).await;

        // The real client rejects empty input before issuing any request, so
        // no network is involved here.
        let config = LlmConfig {
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        };
        let runner = runner_with(
            &ctx,
            Arc::new(FixedExtractor {
                text: "   \n \n  ".to_string(),
            }),
            Arc::new(LlmClient::new(config)),
            store.clone(),
            Duration::from_secs(5),
        );
        runner.process(queued("job-1")).await;

        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("No text to summarize"));
    }

    #[tokio::test]
    async fn test_slow_extraction_times_out() {
        let (ctx, _dir) = setup_test_db().await;
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        store.create(Job::new("job-1".to_string())).await;

        let runner = runner_with(
            &ctx,
            Arc::new(SlowExtractor),
            Arc::new(EchoSummarizer),
            store.clone(),
            Duration::from_millis(50),
        );
        runner.process(queued("job-1")).await;

        let job = store.get("job-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("Text extraction timed out"));
    }
}
