//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{InsightError, Result};
use crate::llm::types::{last_user_content, Message};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Used for unit testing without making real API calls.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Error message returned for every request when set.
    failure: Option<String>,
    /// Artificial latency before answering.
    delay: Option<Duration>,
    /// Number of `complete` calls made, shared across clones.
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the question contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes every request fail with a generation error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Delays every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many times `complete` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("by race") || input_lower.contains("per race") {
            return "```sql\nSELECT json_extract(value, '$.race') AS Race, COUNT(*) AS Count\nFROM records\nGROUP BY Race\nORDER BY Count DESC;\n```".to_string();
        }

        if input_lower.contains("by gender") || input_lower.contains("per gender") {
            return "```sql\nSELECT json_extract(value, '$.gender') AS Gender, COUNT(*) AS Count\nFROM records\nGROUP BY Gender;\n```".to_string();
        }

        if input_lower.contains("by year") || input_lower.contains("per year") {
            return "```sql\nSELECT strftime('%Y', created_at) AS Year, COUNT(*) AS Count\nFROM records\nGROUP BY Year\nORDER BY Year;\n```".to_string();
        }

        if input_lower.contains("how many") || input_lower.contains("count") {
            return "SELECT COUNT(*) AS Count FROM records;".to_string();
        }

        if input_lower.contains("all records") || input_lower.contains("list") {
            return "```sql\nSELECT id, name FROM records ORDER BY id;\n```".to_string();
        }

        if input_lower.contains("delete") {
            return "```sql\nDELETE FROM records;\n```".to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(InsightError::generation(message.clone()));
        }

        let input = last_user_content(messages).unwrap_or_default();
        Ok(self.mock_response(input))
    }
}
