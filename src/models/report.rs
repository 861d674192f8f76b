//! Report models.
//!
//! A report is the stored result of summarizing one uploaded document.
//! Reports start out anonymous with a short-lived public link; attaching
//! one to an account removes the expiry and makes it private.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A summarized medical report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Database row ID.
    pub id: i64,
    /// Owning user, once attached. Anonymous reports have none.
    pub user_id: Option<i64>,
    /// Original filename of the uploaded document.
    pub filename: String,
    /// Generated summary text.
    pub summary: String,
    /// Unguessable id for the public share link.
    pub public_id: String,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// When the public link stops working. Cleared on attach.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Create a new anonymous report expiring `ttl_hours` from now.
    pub fn new_anonymous(filename: String, summary: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by database
            user_id: None,
            filename,
            summary,
            public_id: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: Some(now + Duration::hours(ttl_hours)),
        }
    }

    /// Whether the report belongs to no account yet.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Whether the public link has lapsed.
    ///
    /// Attached reports never expire; their `expires_at` is cleared.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}
