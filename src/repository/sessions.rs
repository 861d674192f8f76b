//! Session token repository.
//!
//! Only token hashes are stored. The raw bearer token exists client-side and
//! in transit; a database leak does not expose usable credentials.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewSession, SessionRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::Session;
use crate::schema::sessions;

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Session {
            id: record.id,
            user_id: record.user_id,
            token_hash: record.token_hash,
            created_at: parse_datetime(&record.created_at),
            expires_at: parse_datetime(&record.expires_at),
        }
    }
}

/// Diesel-based session repository with compile-time query checking.
#[derive(Clone)]
pub struct SessionRepository {
    pool: AsyncSqlitePool,
}

impl SessionRepository {
    /// Create a new session repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new session row.
    pub async fn create(&self, session: &Session) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = session.created_at.to_rfc3339();
        let expires_at = session.expires_at.to_rfc3339();

        diesel::insert_into(sessions::table)
            .values(NewSession {
                user_id: session.user_id,
                token_hash: &session.token_hash,
                created_at: &created_at,
                expires_at: &expires_at,
            })
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Look up a session by its token hash. Expiry is not checked here so
    /// callers can distinguish an expired token from an unknown one.
    pub async fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, DieselError> {
        let mut conn = self.pool.get().await?;

        sessions::table
            .filter(sessions::token_hash.eq(token_hash))
            .first::<SessionRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Session::from))
    }

    /// Delete sessions that expired before `now`. Returns the number removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DieselError> {
        let mut conn = self.pool.get().await?;
        let cutoff = now.to_rfc3339();

        diesel::delete(sessions::table.filter(sessions::expires_at.lt(&cutoff)))
            .execute(&mut conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::DbContext;
    use crate::models::Session;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let ctx = DbContext::new(&db_path);
        ctx.init_schema().await.unwrap();

        (ctx, dir)
    }

    #[tokio::test]
    async fn test_session_lookup() {
        let (ctx, _dir) = setup_test_db().await;
        let user = ctx.users().create("s@example.com", "h").await.unwrap();
        let repo = ctx.sessions();

        let session = Session::new(user.id, "abc123".to_string(), 24);
        repo.create(&session).await.unwrap();

        let fetched = repo.get_by_token_hash("abc123").await.unwrap().unwrap();
        assert_eq!(fetched.user_id, user.id);
        assert!(!fetched.is_expired(Utc::now()));

        assert!(repo.get_by_token_hash("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_sessions() {
        let (ctx, _dir) = setup_test_db().await;
        let user = ctx.users().create("s@example.com", "h").await.unwrap();
        let repo = ctx.sessions();

        let mut stale = Session::new(user.id, "stale".to_string(), 24);
        stale.expires_at = Utc::now() - Duration::hours(1);
        repo.create(&stale).await.unwrap();

        let live = Session::new(user.id, "live".to_string(), 24);
        repo.create(&live).await.unwrap();

        let removed = repo.delete_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);

        assert!(repo.get_by_token_hash("stale").await.unwrap().is_none());
        assert!(repo.get_by_token_hash("live").await.unwrap().is_some());
    }
}
