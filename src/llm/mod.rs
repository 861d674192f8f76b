//! LLM client for medical report summarization.
//!
//! Talks to an OpenAI-compatible chat-completions API (Groq by default).
//! The summarizer is a trait seam so the job pipeline can run against a
//! fake in tests.

mod client;
mod config;
mod prompts;

pub use client::{LlmClient, Summarizer, SummaryError};
pub use config::LlmConfig;
