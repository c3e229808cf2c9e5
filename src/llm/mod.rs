//! LLM integration for db-insight.
//!
//! The text-generation engine is an injected [`LlmClient`]; the
//! [`QueryGenerator`] wraps one to turn questions into candidate SQL.

pub mod anthropic;
pub mod factory;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use factory::create_client;
pub use generator::QueryGenerator;
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::{extract_query, strip_code_fence};
pub use prompt::{build_messages, build_system_prompt};
pub use types::{Message, Role};

pub use crate::safety::CandidateQuery;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::str::FromStr;

use crate::error::{InsightError, Result};

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) so one client can serve
/// concurrent pipeline runs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string. Makes exactly one
    /// request; failures are not retried.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI (GPT-4o, etc.)
    #[default]
    OpenAi,
    /// Anthropic (Claude)
    Anthropic,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = InsightError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(InsightError::config(format!(
                "Unknown LLM provider: {s}. Expected: openai, anthropic, or mock"
            ))),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a transport-level request failure to a generation error.
pub(crate) fn request_error(provider: &str, error: &reqwest::Error) -> InsightError {
    if error.is_timeout() {
        InsightError::generation(format!("{provider} request timed out"))
    } else if error.is_connect() {
        InsightError::generation(format!(
            "Failed to connect to the {provider} API. Check your network."
        ))
    } else {
        InsightError::generation(format!("{provider} request failed: {error}"))
    }
}

/// Maps a non-success HTTP status to a generation error.
///
/// `api_message` is the provider's own error text when the body carried one.
pub(crate) fn status_error(
    provider: &str,
    key_var: &str,
    status: StatusCode,
    api_message: Option<String>,
) -> InsightError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InsightError::generation(format!(
            "Authentication failed. Check your {key_var}."
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            InsightError::generation(format!("{provider} rate limited the request"))
        }
        _ => match api_message {
            Some(message) => InsightError::generation(format!("{provider} API error: {message}")),
            None => InsightError::generation(format!("{provider} API error ({status})")),
        },
    }
}
