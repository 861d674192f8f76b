//! MedBrief - medical report summarization service.
//!
//! Turns uploaded medical documents (PDF or image) into plain-language
//! summaries and serves them over a small REST API.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medbrief::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "medbrief=info"
    } else {
        "medbrief=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
