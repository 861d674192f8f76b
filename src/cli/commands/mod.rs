//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract_cmd;
mod init;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "medbrief")]
#[command(about = "Medical report summarization service")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    /// Can be a directory containing medbrief.db or a .db file directly.
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the HTTP server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:5000)
        #[arg(default_value = "127.0.0.1:5000")]
        bind: String,

        /// Number of background processing workers (overrides config)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Extract text from a report file without summarizing it
    Extract {
        /// PDF or image file to extract
        file: PathBuf,

        /// Output as JSON (text, method, page count, detected lab values)
        #[arg(long)]
        json: bool,
    },

    /// Check that the external extraction tools are installed
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (mut settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind, workers } => {
            if let Some(workers) = workers {
                settings.workers = workers;
            }
            serve::cmd_serve(&settings, &config, &bind).await
        }
        Commands::Extract { file, json } => extract_cmd::cmd_extract(&config, &file, json).await,
        Commands::Check => check::cmd_check().await,
    }
}
