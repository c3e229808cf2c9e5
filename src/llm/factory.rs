//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::sync::Arc;

use crate::error::{InsightError, Result};
use crate::llm::{
    anthropic, openai, AnthropicClient, AnthropicConfig, LlmClient, LlmProvider, MockLlmClient,
    OpenAiClient, OpenAiConfig,
};

/// Creates an LLM client for the given provider.
///
/// If `api_key` is provided, it takes precedence over environment variables.
/// For providers that require an API key (OpenAI, Anthropic), the key is resolved in order:
/// 1. Provided `api_key` parameter
/// 2. Environment variable (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`)
///
/// The model is resolved the same way: the `model` argument, then
/// `OPENAI_MODEL` / `ANTHROPIC_MODEL`, then the provider default.
pub fn create_client(
    provider: LlmProvider,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: u64,
) -> Result<Arc<dyn LlmClient>> {
    match provider {
        LlmProvider::OpenAi => {
            let key = resolve_key(api_key, "OPENAI_API_KEY")?;
            let model = model
                .or_else(|| std::env::var("OPENAI_MODEL").ok())
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
            let config = OpenAiConfig::new(key, model).with_timeout(timeout_secs);
            Ok(Arc::new(OpenAiClient::new(config)?))
        }
        LlmProvider::Anthropic => {
            let key = resolve_key(api_key, "ANTHROPIC_API_KEY")?;
            let model = model
                .or_else(|| std::env::var("ANTHROPIC_MODEL").ok())
                .unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            let config = AnthropicConfig::new(key, model).with_timeout(timeout_secs);
            Ok(Arc::new(AnthropicClient::new(config)?))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}

fn resolve_key(api_key: Option<String>, var: &str) -> Result<String> {
    api_key
        .or_else(|| std::env::var(var).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| InsightError::config(format!("No API key configured. Set {var}.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_client() {
        let client = create_client(LlmProvider::Mock, None, None, 30);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_openai_without_key_fails() {
        // Temporarily unset the env var if it exists
        let original = std::env::var("OPENAI_API_KEY").ok();
        std::env::remove_var("OPENAI_API_KEY");

        let result = create_client(LlmProvider::OpenAi, None, None, 30);
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert!(err.to_string().contains("No API key configured"));
        assert!(matches!(err, InsightError::Config(_)));

        // Restore
        if let Some(key) = original {
            std::env::set_var("OPENAI_API_KEY", key);
        }
    }

    #[test]
    fn test_create_openai_with_provided_key() {
        let result = create_client(
            LlmProvider::OpenAi,
            Some("test-key".to_string()),
            Some("gpt-4o-mini".to_string()),
            10,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_anthropic_without_key_fails() {
        let original = std::env::var("ANTHROPIC_API_KEY").ok();
        std::env::remove_var("ANTHROPIC_API_KEY");

        let result = create_client(LlmProvider::Anthropic, None, None, 30);
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        if let Some(key) = original {
            std::env::set_var("ANTHROPIC_API_KEY", key);
        }
    }

    #[test]
    fn test_create_anthropic_with_provided_key() {
        let result = create_client(LlmProvider::Anthropic, Some("test-key".to_string()), None, 30);
        assert!(result.is_ok());
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let result = create_client(LlmProvider::OpenAi, Some("  ".to_string()), None, 30);
        assert!(result.is_err());
    }
}
