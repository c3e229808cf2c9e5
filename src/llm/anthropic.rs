//! Anthropic LLM client implementation.
//!
//! Implements the LlmClient trait for Anthropic's messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{InsightError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::{request_error, status_error, LlmClient};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anthropic API base URL.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum tokens to generate. Queries are short.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const PROVIDER: &str = "Anthropic";
const KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Anthropic client configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Anthropic LLM client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicClient {
    /// Creates a new Anthropic client with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InsightError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Builds the request body; Anthropic takes the system prompt as a separate field.
    fn build_request(&self, messages: &[Message]) -> MessagesRequest {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let turns = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Turn {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: if system.is_empty() { None } else { Some(system) },
            messages: turns,
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = self.build_request(messages);
        debug!(model = %self.config.model, message_count = messages.len(), "Sending Anthropic request");

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(PROVIDER, &e))?;

        if !status.is_success() {
            let api_message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .map(|r| r.error.message);
            return Err(status_error(PROVIDER, KEY_VAR, status, api_message));
        }

        parse_completion(&body)
    }
}

/// Concatenates the text blocks of a messages response.
fn parse_completion(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| InsightError::generation(format!("Malformed Anthropic response: {e}")))?;

    let text = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text)
        .collect::<String>();

    if text.trim().is_empty() {
        return Err(InsightError::generation("Anthropic returned an empty response"));
    }

    Ok(text)
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct Turn {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
