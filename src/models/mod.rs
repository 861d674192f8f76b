//! Data models for MedBrief.

mod job;
mod report;
mod user;

pub use job::{Job, JobStatus};
pub use report::Report;
pub use user::{Session, User};
