//! User account repository.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use chrono::Utc;

use super::models::{NewUser, UserRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::User;
use crate::schema::users;

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based user repository with compile-time query checking.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncSqlitePool,
}

impl UserRepository {
    /// Create a new user repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return the stored row.
    ///
    /// The email column is unique, so inserting a taken address fails with a
    /// database error; callers should check [`Self::email_exists`] first to
    /// report the conflict cleanly.
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User, DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = Utc::now().to_rfc3339();

        diesel::insert_into(users::table)
            .values(NewUser {
                email,
                password_hash,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;

        users::table
            .filter(users::email.eq(email))
            .first::<UserRecord>(&mut conn)
            .await
            .map(User::from)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i64) -> Result<Option<User>, DieselError> {
        let mut conn = self.pool.get().await?;

        users::table
            .find(id)
            .first::<UserRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(User::from))
    }

    /// Get a user by email address.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DieselError> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(email))
            .first::<UserRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(User::from))
    }

    /// Check if an email address is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = users::table
            .filter(users::email.eq(email))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::DbContext;
    use tempfile::tempdir;

    async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let ctx = DbContext::new(&db_path);
        ctx.init_schema().await.unwrap();

        (ctx, dir)
    }

    #[tokio::test]
    async fn test_user_crud() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.users();

        let user = repo.create("alice@example.com", "salt$hash").await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.email, "alice@example.com");

        assert!(repo.email_exists("alice@example.com").await.unwrap());
        assert!(!repo.email_exists("bob@example.com").await.unwrap());

        let fetched = repo.get(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.password_hash, "salt$hash");

        let by_email = repo.get_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);

        assert!(repo.get(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.users();

        repo.create("dup@example.com", "h1").await.unwrap();
        assert!(repo.create("dup@example.com", "h2").await.is_err());
    }
}
