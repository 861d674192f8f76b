//! MedBrief - medical report summarization service.
//!
//! Accepts uploaded medical reports (PDF or image), extracts their text
//! with a fast structural pass and an OCR fallback, asks a language model
//! for a summary, and serves results over a small REST API with
//! poll-until-done job tracking.

pub mod auth;
pub mod cli;
pub mod config;
pub mod extract;
pub mod jobs;
pub mod llm;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod storage;
