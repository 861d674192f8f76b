//! Report repository.
//!
//! Reports start out anonymous with a limited-time public link and may later
//! be claimed by a user, which clears the expiry. Ownership checks live in
//! the queries themselves so handlers cannot skip them by accident.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewReport, ReportRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::Report;
use crate::schema::reports;

impl From<ReportRecord> for Report {
    fn from(record: ReportRecord) -> Self {
        Report {
            id: record.id,
            user_id: record.user_id,
            filename: record.filename,
            summary: record.summary,
            public_id: record.public_id,
            created_at: parse_datetime(&record.created_at),
            expires_at: parse_datetime_opt(record.expires_at),
        }
    }
}

/// Diesel-based report repository with compile-time query checking.
#[derive(Clone)]
pub struct ReportRepository {
    pool: AsyncSqlitePool,
}

impl ReportRepository {
    /// Create a new report repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a report and return its generated row id and public id.
    pub async fn insert(&self, report: &Report) -> Result<(i64, String), DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = report.created_at.to_rfc3339();
        let expires_at = report.expires_at.map(|dt| dt.to_rfc3339());

        diesel::insert_into(reports::table)
            .values(NewReport {
                user_id: report.user_id,
                filename: &report.filename,
                summary: &report.summary,
                public_id: &report.public_id,
                created_at: &created_at,
                expires_at: expires_at.as_deref(),
            })
            .execute(&mut conn)
            .await?;

        // public_id is unique, so the generated row id can be read back
        // without RETURNING support
        let id: i64 = reports::table
            .filter(reports::public_id.eq(&report.public_id))
            .select(reports::id)
            .first(&mut conn)
            .await?;

        Ok((id, report.public_id.clone()))
    }

    /// Get a report by ID.
    pub async fn get(&self, id: i64) -> Result<Option<Report>, DieselError> {
        let mut conn = self.pool.get().await?;

        reports::table
            .find(id)
            .first::<ReportRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Report::from))
    }

    /// Get a report only if it is owned by the given user.
    pub async fn get_owned(&self, id: i64, user_id: i64) -> Result<Option<Report>, DieselError> {
        let mut conn = self.pool.get().await?;

        reports::table
            .find(id)
            .filter(reports::user_id.eq(user_id))
            .first::<ReportRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Report::from))
    }

    /// Get an unclaimed report by its public id. Claimed reports are not
    /// visible through the public link even if the id is known.
    pub async fn get_anonymous_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<Report>, DieselError> {
        let mut conn = self.pool.get().await?;

        reports::table
            .filter(reports::public_id.eq(public_id))
            .filter(reports::user_id.is_null())
            .first::<ReportRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Report::from))
    }

    /// List a user's reports, newest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Report>, DieselError> {
        let mut conn = self.pool.get().await?;

        reports::table
            .filter(reports::user_id.eq(user_id))
            .order(reports::created_at.desc())
            .load::<ReportRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Report::from).collect())
    }

    /// Claim an anonymous report for a user, clearing its expiry.
    ///
    /// Returns false if the report does not exist or is already claimed; the
    /// filter and update run as one statement so two concurrent claims cannot
    /// both succeed.
    pub async fn attach_to_user(&self, report_id: i64, user_id: i64) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::update(
            reports::table
                .find(report_id)
                .filter(reports::user_id.is_null()),
        )
        .set((
            reports::user_id.eq(Some(user_id)),
            reports::expires_at.eq(None::<String>),
        ))
        .execute(&mut conn)
        .await?;

        Ok(rows > 0)
    }
}
