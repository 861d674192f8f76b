//! Configuration management for MedBrief.
//!
//! Settings come from three layers, lowest priority first: built-in
//! defaults, an optional config file (TOML or JSON), and environment
//! variables. CLI flags such as `--data` override all of them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::extract::ExtractConfig;
use crate::llm::LlmConfig;
use crate::repository::DbContext;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "medbrief.db";

/// Default uploads subdirectory name.
const UPLOADS_SUBDIR: &str = "uploads";

/// Default number of summarization workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of the pending-job queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Hours an unattached report stays retrievable via its public link.
pub const DEFAULT_REPORT_TTL_HOURS: i64 = 12;

/// Hours a login session stays valid.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    /// Set via DATABASE_URL env var or config.
    pub database_url: Option<String>,
    /// Directory for storing uploaded documents.
    pub uploads_dir: PathBuf,
    /// Number of background workers processing uploads.
    pub workers: usize,
    /// Capacity of the pending-job queue.
    pub queue_capacity: usize,
    /// Hours before an unattached report expires.
    pub report_ttl_hours: i64,
    /// Hours before a login session expires.
    pub session_ttl_hours: i64,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/Documents/medbrief/ for user data
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medbrief");

        Self {
            uploads_dir: data_dir.join(UPLOADS_SUBDIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            report_ttl_hours: DEFAULT_REPORT_TTL_HOURS,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            uploads_dir: data_dir.join(UPLOADS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for (dir, label) in [(&self.data_dir, "data"), (&self.uploads_dir, "uploads")] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create {} directory '{}': {}",
                        label,
                        dir.display(),
                        e
                    ),
                )
            })?;
        }
        Ok(())
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Number of background workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Capacity of the pending-job queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
    /// Hours before an unattached report expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_ttl_hours: Option<i64>,
    /// Hours before a login session expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<i64>,
    /// LLM configuration for report summarization.
    #[serde(default, skip_serializing_if = "LlmConfig::is_default")]
    pub llm: LlmConfig,
    /// Text extraction configuration.
    #[serde(default, skip_serializing_if = "ExtractConfig::is_default")]
    pub extract: ExtractConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file. The format follows the
    /// extension: `.json` parses as JSON, anything else as TOML.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let mut config: Config = if is_json {
            serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?
        } else {
            toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?
        };

        config.source_path = Some(path.to_path_buf());
        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }

    /// Load configuration from the first standard location that exists,
    /// falling back to env-adjusted defaults.
    pub async fn load() -> Self {
        for path in default_config_paths() {
            if !path.exists() {
                continue;
            }
            if let Ok(config) = Self::load_from_path(&path).await {
                return config;
            }
        }
        Self::default_with_env()
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self {
            llm: LlmConfig::default().with_env_overrides(),
            ..Self::default()
        }
    }

    /// Directory the config file was loaded from, if it came from a file.
    /// Relative paths inside the file resolve against this.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(Path::to_path_buf))
    }

    /// Resolve a possibly-relative, possibly-tilded path against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Fold file values into settings. Worker and queue counts are floored
    /// at one; zero of either would wedge the pipeline.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.uploads_dir = settings.data_dir.join(UPLOADS_SUBDIR);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(workers) = self.workers {
            settings.workers = workers.max(1);
        }
        if let Some(capacity) = self.queue_capacity {
            settings.queue_capacity = capacity.max(1);
        }
        if let Some(hours) = self.report_ttl_hours {
            settings.report_ttl_hours = hours;
        }
        if let Some(hours) = self.session_ttl_hours {
            settings.session_ttl_hours = hours;
        }
    }
}

/// Candidate config file locations, highest priority first: the working
/// directory, then the user config directory.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("medbrief.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("medbrief").join("medbrief.toml"));
    }
    paths
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--data flag).
    /// Can be a directory containing medbrief.db or a .db file directly.
    pub data: Option<PathBuf>,
}

/// Interpret the `--data` flag: a database file means its parent directory
/// plus that filename, anything else means a data directory holding the
/// default database name.
fn resolve_data_flag(path: &Path) -> (PathBuf, String) {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    let looks_like_db = path
        .extension()
        .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
        || (path.exists() && path.is_file());

    if looks_like_db {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_DATABASE_FILENAME)
            .to_string();
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        (dir, filename)
    } else {
        (path, DEFAULT_DATABASE_FILENAME.to_string())
    }
}

/// Look for a config file sitting next to the database.
fn find_config_next_to_db(data_dir: &Path) -> Option<PathBuf> {
    ["medbrief", "config"]
        .iter()
        .flat_map(|basename| {
            ["toml", "json"]
                .iter()
                .map(move |ext| data_dir.join(format!("{}.{}", basename, ext)))
        })
        .find(|path| path.exists())
}

/// Pick the config source: an explicit `--config` path wins, then a config
/// next to the data directory, then the standard locations.
async fn load_config_from_sources(options: &LoadOptions, data_dir: Option<&Path>) -> Config {
    let explicit = options.config_path.as_deref();
    let next_to_db = data_dir.and_then(find_config_next_to_db);

    let candidate = match (explicit, next_to_db.as_deref()) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(path)) => {
            tracing::debug!("Found config next to data dir: {}", path.display());
            Some(path.to_path_buf())
        }
        (None, None) => None,
    };

    match candidate {
        Some(path) => Config::load_from_path(&path)
            .await
            .unwrap_or_else(|_| Config::default_with_env()),
        None => Config::load().await,
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let data_override = options.data.as_deref().map(resolve_data_flag);

    let config =
        load_config_from_sources(&options, data_override.as_ref().map(|(dir, _)| dir.as_path()))
            .await;

    let mut settings = Settings::default();

    // Relative paths in the file resolve against its own directory unless
    // --cwd asks for the working directory.
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd()
    } else {
        config.base_dir().unwrap_or_else(cwd)
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data overrides whatever the config file said.
    if let Some((data_dir, database_filename)) = data_override {
        settings.uploads_dir = data_dir.join(UPLOADS_SUBDIR);
        settings.data_dir = data_dir;
        settings.database_filename = database_filename;
    }

    // DATABASE_URL environment variable takes highest precedence
    if let Some(database_url) = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
        tracing::debug!("Using DATABASE_URL from environment: {}", database_url);
        settings.database_url = Some(database_url);
    }

    (settings, config)
}
