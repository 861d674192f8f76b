//! Diesel ORM models for database tables.
//!
//! Record structs mirror the table layout exactly; `New*` structs borrow
//! their fields so inserts avoid cloning. Datetimes are stored as RFC 3339
//! text and converted at the repository boundary.

use diesel::prelude::*;

use crate::schema;

/// User row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// New user for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: &'a str,
}

/// Session row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub created_at: String,
    pub expires_at: String,
}

/// New session for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: i64,
    pub token_hash: &'a str,
    pub created_at: &'a str,
    pub expires_at: &'a str,
}

/// Report row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub filename: String,
    pub summary: String,
    pub public_id: String,
    pub created_at: String,
    pub expires_at: Option<String>,
}

/// New report for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::reports)]
pub struct NewReport<'a> {
    pub user_id: Option<i64>,
    pub filename: &'a str,
    pub summary: &'a str,
    pub public_id: &'a str,
    pub created_at: &'a str,
    pub expires_at: Option<&'a str>,
}
