//! Repository layer for database persistence.
//!
//! All database access uses Diesel with compile-time query checking over an
//! async SQLite connection. Repositories are cheap clones over the shared
//! pool and convert between row records and domain models at their boundary.

pub mod context;
pub mod models;
pub mod pool;

pub mod reports;
pub mod sessions;
pub mod users;

pub use context::DbContext;
pub use pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};
pub use reports::ReportRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
