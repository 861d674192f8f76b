//! Async SQLite connection handling.
//!
//! SQLite connections are cheap to open, so the pool creates one per request
//! instead of caching them. This keeps lock contention simple under the
//! single-writer model SQLite enforces anyway.

use std::path::Path;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;

/// Async SQLite connection type.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Lightweight "pool" that opens a fresh connection per request.
#[derive(Clone)]
pub struct AsyncSqlitePool {
    database_url: String,
}

impl AsyncSqlitePool {
    /// Create a new pool for the given database URL.
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    /// Create a pool from a file path.
    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> Result<AsyncSqliteConnection, DieselError> {
        AsyncSqliteConnection::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Wrapper carrying a plain message through Diesel's database error type.
struct DbErrorInfo(String);

impl DatabaseErrorInformation for DbErrorInfo {
    fn message(&self) -> &str {
        &self.0
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        None
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Convert a non-Diesel error into a Diesel error so repository methods can
/// keep a single error type.
pub fn to_diesel_error(e: impl std::fmt::Display) -> DieselError {
    DieselError::DatabaseError(
        DatabaseErrorKind::Unknown,
        Box::new(DbErrorInfo(e.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_sqlite_prefix() {
        let pool = AsyncSqlitePool::new("sqlite:/tmp/test.db");
        assert_eq!(pool.database_url(), "/tmp/test.db");

        let pool = AsyncSqlitePool::new("/tmp/plain.db");
        assert_eq!(pool.database_url(), "/tmp/plain.db");
    }

    #[test]
    fn test_to_diesel_error_preserves_message() {
        let err = to_diesel_error("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
