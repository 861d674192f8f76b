//! Worker pool consuming the job queue.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use super::queue::QueuedJob;
use super::runner::JobRunner;

/// Spawn the worker pool.
///
/// At most `concurrency` jobs run at once; the queue itself bounds how many
/// more can wait. The pool stops when every queue sender is dropped.
pub fn spawn_workers(
    runner: JobRunner,
    mut receiver: mpsc::Receiver<QueuedJob>,
    concurrency: usize,
) -> JoinHandle<()> {
    let limit = concurrency.max(1);

    tokio::spawn(async move {
        tracing::info!("Job workers started ({} concurrent)", limit);
        let semaphore = Arc::new(Semaphore::new(limit));

        while let Some(job) = receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let runner = runner.clone();
            tokio::spawn(async move {
                runner.process(job).await;
                drop(permit);
            });
        }

        tracing::info!("Job queue closed, workers stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::extract::{Extract, ExtractionError, ExtractionMethod, ExtractionResult};
    use crate::jobs::queue::JobQueue;
    use crate::jobs::store::{JobStore, MemoryJobStore};
    use crate::llm::{Summarizer, SummaryError};
    use crate::models::{Job, JobStatus};
    use crate::repository::DbContext;

    struct SlowExtractor {
        delay: Duration,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl Extract for SlowExtractor {
        fn extract(
            &self,
            _path: &Path,
            _extension: &str,
        ) -> Result<ExtractionResult, ExtractionError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(ExtractionResult {
                text: "Patient in good health overall.".to_string(),
                method: ExtractionMethod::PdfText,
                page_count: Some(1),
            })
        }
    }

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
            Ok(text.to_string())
        }
    }

    fn queued(id: &str) -> QueuedJob {
        QueuedJob {
            job_id: id.to_string(),
            file_path: PathBuf::from("/tmp/upload.pdf"),
            filename: "upload.pdf".to_string(),
            extension: "pdf".to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_bounds_concurrency_and_drains_queue() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();

        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        let runner = JobRunner::new(
            Arc::new(SlowExtractor {
                delay: Duration::from_millis(50),
                in_flight: in_flight.clone(),
                max_in_flight: max_in_flight.clone(),
            }),
            Arc::new(EchoSummarizer),
            ctx.reports(),
            store.clone(),
            12,
            Duration::from_secs(5),
        );

        let (queue, receiver) = JobQueue::new(8);
        let pool = spawn_workers(runner, receiver, 2);

        for i in 0..6 {
            let id = format!("job-{}", i);
            store.create(Job::new(id.clone())).await;
            queue.dispatch(queued(&id)).unwrap();
        }

        // Closing the sender lets the pool drain and stop.
        drop(queue);
        pool.await.unwrap();

        // Spawned job tasks may still be finishing after the pool loop exits.
        for _ in 0..50 {
            let mut done = 0;
            for i in 0..6 {
                let job = store.get(&format!("job-{}", i)).await.unwrap();
                if job.status == JobStatus::Done {
                    done += 1;
                }
            }
            if done == 6 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        for i in 0..6 {
            let job = store.get(&format!("job-{}", i)).await.unwrap();
            assert_eq!(job.status, JobStatus::Done, "job-{} not done", i);
        }
        assert!(
            max_in_flight.load(Ordering::SeqCst) <= 2,
            "more than two extractions ran at once"
        );
    }
}
