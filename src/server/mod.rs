//! HTTP server for the summarization pipeline.
//!
//! Uploads are accepted and queued; a bounded worker pool runs extraction
//! and summarization in the background while clients poll for the result.
//! Account routes sit behind bearer-token auth, anonymous reports are
//! reachable through their public link until they expire or get claimed.

mod error;
mod handlers;
mod routes;
mod session;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::{Config, Settings};
use crate::extract::{Extract, TextExtractor};
use crate::jobs::{spawn_workers, JobQueue, JobRunner, JobStore, MemoryJobStore};
use crate::llm::{LlmClient, Summarizer};
use crate::repository::DbContext;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DbContext,
    pub jobs: Arc<dyn JobStore>,
    pub queue: JobQueue,
}

impl AppState {
    /// Wire the full pipeline from configuration: database, extractor,
    /// summarizer, job store, queue, and worker pool.
    pub async fn new(settings: &Settings, config: &Config) -> anyhow::Result<Self> {
        let db = settings.create_db_context();
        db.init_schema().await?;

        let removed = db.sessions().delete_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!("Removed {} expired sessions", removed);
        }

        let extractor: Arc<dyn Extract> = Arc::new(TextExtractor::from_config(&config.extract));
        let summarizer: Arc<dyn Summarizer> = Arc::new(LlmClient::new(config.llm.clone()));
        let extract_timeout = Duration::from_secs(config.extract.timeout_secs);

        Ok(Self::with_services(
            settings.clone(),
            db,
            extractor,
            summarizer,
            extract_timeout,
        ))
    }

    /// Wire the pipeline around injected extraction and summarization
    /// services. The worker pool starts immediately and drains the queue
    /// until every sender is dropped.
    pub fn with_services(
        settings: Settings,
        db: DbContext,
        extractor: Arc<dyn Extract>,
        summarizer: Arc<dyn Summarizer>,
        extract_timeout: Duration,
    ) -> Self {
        let jobs: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let (queue, receiver) = JobQueue::new(settings.queue_capacity);

        let runner = JobRunner::new(
            extractor,
            summarizer,
            db.reports(),
            Arc::clone(&jobs),
            settings.report_ttl_hours,
            extract_timeout,
        );
        spawn_workers(runner, receiver, settings.workers);

        Self {
            settings: Arc::new(settings),
            db,
            jobs,
            queue,
        }
    }
}

/// Start the HTTP server and block until it exits.
pub async fn serve(settings: &Settings, config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings, config).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
