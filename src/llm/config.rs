//! Summarizer configuration.

use serde::{Deserialize, Serialize};

use super::prompts::DEFAULT_SUMMARY_PROMPT;

/// Configuration for the summarization client.
///
/// Any OpenAI-compatible chat-completions endpoint works; the defaults
/// point at Groq.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether summarization is enabled.
    pub enabled: bool,
    /// API endpoint base, without the /v1/chat/completions path.
    pub endpoint: String,
    /// API key, sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used for summarization.
    pub model: String,
    /// Response token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Custom summary prompt, with a `{content}` placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
    /// Cap on extracted-text characters sent per request.
    pub max_content_chars: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: GROQ_ENDPOINT.to_string(),
            api_key: None,
            model: "openai/gpt-oss-120b".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
            summary_prompt: None,
            max_content_chars: 12000,
            timeout_secs: 120,
        }
    }
}

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai";
const OPENAI_ENDPOINT: &str = "https://api.openai.com";

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl LlmConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// `LLM_ENABLED`, `LLM_ENDPOINT`, `LLM_API_KEY`, `LLM_MODEL`,
    /// `LLM_MAX_TOKENS`, `LLM_TEMPERATURE`, `LLM_MAX_CONTENT_CHARS`, and
    /// `LLM_SUMMARY_PROMPT` each override their field. Without an explicit
    /// key, `GROQ_API_KEY` or `OPENAI_API_KEY` is picked up and the
    /// endpoint follows the detected provider.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(val) = env_string("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        let explicit_endpoint = env_string("LLM_ENDPOINT");
        if let Some(ref endpoint) = explicit_endpoint {
            self.endpoint = endpoint.clone();
        }

        if let Some(key) = env_string("LLM_API_KEY") {
            self.api_key = Some(key);
        }

        // No explicit key, fall back to the provider-specific ones
        if self.api_key.is_none() {
            let detected = env_string("GROQ_API_KEY")
                .map(|key| (key, GROQ_ENDPOINT))
                .or_else(|| env_string("OPENAI_API_KEY").map(|key| (key, OPENAI_ENDPOINT)));
            if let Some((key, endpoint)) = detected {
                self.api_key = Some(key);
                if explicit_endpoint.is_none() {
                    self.endpoint = endpoint.to_string();
                }
            }
        }

        if let Some(model) = env_string("LLM_MODEL") {
            self.model = model;
        }
        if let Some(n) = env_parsed("LLM_MAX_TOKENS") {
            self.max_tokens = n;
        }
        if let Some(t) = env_parsed("LLM_TEMPERATURE") {
            self.temperature = t;
        }
        if let Some(n) = env_parsed("LLM_MAX_CONTENT_CHARS") {
            self.max_content_chars = n;
        }
        if let Some(prompt) = env_string("LLM_SUMMARY_PROMPT") {
            self.summary_prompt = Some(prompt);
        }
        self
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_summary_prompt(&self) -> &str {
        self.summary_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_PROMPT)
    }
}
