//! User and session models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database row ID.
    pub id: i64,
    /// Login email, unique per account.
    pub email: String,
    /// PBKDF2 password hash in `salt$hash` hex form. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A login session backing one bearer token.
///
/// Only the SHA-256 hash of the token is stored; the token itself is
/// handed to the client once at login and never kept server-side.
#[derive(Debug, Clone)]
pub struct Session {
    /// Database row ID.
    pub id: i64,
    /// Account this session belongs to.
    pub user_id: i64,
    /// SHA-256 hex of the bearer token.
    pub token_hash: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops authenticating requests.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session valid for `ttl_hours` from now.
    pub fn new(user_id: i64, token_hash: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by database
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        }
    }

    /// Whether the session has lapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let session = Session::new(1, "hash".to_string(), 24);
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(Utc::now() + Duration::hours(25)));
    }
}
