//! Claude API client backing the motivational quote and journal analysis features.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::insights::TextGenerator;

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Error)]
pub enum ClaudeApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api key: ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for Claude API
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

/// Content block in response
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Response from Claude API
#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl ClaudeResponse {
    /// Extract the text content from the response
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
        })
    }
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Claude API client
#[derive(Debug, Clone)]
pub struct ClaudeApiClient {
    http: Client,
    api_key: SecretString,
    model: String,
}

impl ClaudeApiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new client with the given API key
    pub fn new(api_key: SecretString, model: Option<String>) -> Result<Self, ClaudeApiError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("discipline-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClaudeApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single completion request. Failures are returned as-is, never retried.
    pub async fn complete(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        max_tokens: u32,
    ) -> Result<ClaudeResponse, ClaudeApiError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens,
            messages,
            system,
        };

        let res = self
            .http
            .post(CLAUDE_API_URL)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        debug!(status = status.as_u16(), model = %self.model, "Claude API responded");
        if status.is_success() {
            return res
                .json::<ClaudeResponse>()
                .await
                .map_err(|e| ClaudeApiError::Serde(e.to_string()));
        }

        let body = res.text().await.unwrap_or_default();
        Err(error_for_status(status, body))
    }

    /// Simple helper to send a single user message and get a response
    pub async fn ask(&self, prompt: &str, system: Option<String>) -> Result<String, ClaudeApiError> {
        let response = self
            .complete(vec![Message::user(prompt)], system, DEFAULT_MAX_TOKENS)
            .await?;

        response
            .text()
            .map(|s| s.to_string())
            .ok_or_else(|| ClaudeApiError::Serde("No text content in response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for ClaudeApiClient {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, ClaudeApiError> {
        self.ask(prompt, system.map(str::to_string)).await
    }
}

fn error_for_status(status: StatusCode, body: String) -> ClaudeApiError {
    match status {
        StatusCode::UNAUTHORIZED => ClaudeApiError::InvalidApiKey,
        StatusCode::TOO_MANY_REQUESTS => ClaudeApiError::RateLimited,
        s => ClaudeApiError::Http {
            status: s.as_u16(),
            body,
        },
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ClaudeApiError {
    if e.is_timeout() {
        ClaudeApiError::Timeout
    } else {
        ClaudeApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_is_first_text_block() {
        let body = r#"{
            "id": "msg_1",
            "content": [{"type": "text", "text": "Discipline is remembering what you want."}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 9}
        }"#;
        let response: ClaudeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("Discipline is remembering what you want."));
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new()),
            ClaudeApiError::InvalidApiKey
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ClaudeApiError::RateLimited
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            ClaudeApiError::Http { status: 502, .. }
        ));
    }

    #[test]
    fn request_omits_missing_system_prompt() {
        let request = ClaudeRequest {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 16,
            messages: vec![Message::user("hi")],
            system: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn client_defaults_model() {
        let client = ClaudeApiClient::new(SecretString::from("test-key".to_string()), None).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
