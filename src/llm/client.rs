//! Chat-completions client and the summarizer seam.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::config::LlmConfig;

/// Errors that can occur during summarization.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Summarization is disabled")]
    Disabled,

    #[error("No text to summarize")]
    EmptyInput,

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Summarization seam.
///
/// The production implementation calls a chat-completions API; tests
/// substitute fakes to control output and failure modes.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary for extracted report text.
    ///
    /// Rejects empty or whitespace-only input with `EmptyInput`.
    async fn summarize(&self, text: &str) -> Result<String, SummaryError>;
}

/// LLM client for report summarization.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Truncate content to configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.config.max_content_chars {
            return text;
        }
        // Find a valid UTF-8 boundary at or before max_content_chars
        let mut end = self.config.max_content_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call the chat-completions API with a prompt.
    async fn call_chat(&self, prompt: &str) -> Result<String, SummaryError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(SummaryError::MissingApiKey)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummaryError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| SummaryError::Parse(e.to_string()))?;

        if let Some(error) = chat_resp.error {
            return Err(SummaryError::Api(error.message));
        }

        let content = chat_resp
            .choices
            .and_then(|c| c.into_iter().next())
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(SummaryError::Parse("Empty completion response".to_string()));
        }

        Ok(content)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        if !self.config.enabled {
            return Err(SummaryError::Disabled);
        }
        if text.trim().is_empty() {
            return Err(SummaryError::EmptyInput);
        }

        let truncated = self.truncate_content(text);
        let prompt = self
            .config
            .get_summary_prompt()
            .replace("{content}", truncated);

        debug!("Requesting summary ({} chars of text)", truncated.len());
        let response = self.call_chat(&prompt).await?;

        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_empty_input() {
        let client = LlmClient::new(LlmConfig::default());
        assert!(matches!(
            client.summarize("").await,
            Err(SummaryError::EmptyInput)
        ));
        assert!(matches!(
            client.summarize("   \n\t ").await,
            Err(SummaryError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_disabled_client_refuses() {
        let config = LlmConfig {
            enabled: false,
            ..LlmConfig::default()
        };
        let client = LlmClient::new(config);
        assert!(matches!(
            client.summarize("some report text").await,
            Err(SummaryError::Disabled)
        ));
    }

    #[test]
    fn test_truncate_respects_utf8_boundaries() {
        let config = LlmConfig {
            max_content_chars: 5,
            ..LlmConfig::default()
        };
        let client = LlmClient::new(config);

        let text = "ééééé"; // 10 bytes, every boundary is 2 bytes wide
        let truncated = client.truncate_content(text);
        assert!(text.starts_with(truncated));
        assert!(truncated.len() <= 5);

        let text2 = "aééé"; // boundaries at 1, 3, 5, 7
        let truncated2 = client.truncate_content(text2);
        assert!(truncated2.len() <= 5);
        assert!(text2.starts_with(truncated2));
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert!(config.model.contains("gpt-oss"));
        assert!(config.summary_prompt.is_none());
        assert!(config.get_summary_prompt().contains("{content}"));
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn test_prompt_substitution() {
        let config = LlmConfig::default();
        let prompt = config
            .get_summary_prompt()
            .replace("{content}", "TEXT HERE");
        assert!(prompt.contains("TEXT HERE"));
        assert!(!prompt.contains("{content}"));
    }
}
