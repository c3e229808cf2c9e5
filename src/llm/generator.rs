//! Question-to-SQL generation.
//!
//! Wraps an [`LlmClient`] with the records schema prompt, a timeout and
//! response post-processing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::Schema;
use crate::error::{InsightError, Result};
use crate::llm::parser::extract_query;
use crate::llm::prompt::{build_messages, build_system_prompt};
use crate::llm::LlmClient;
use crate::pipeline::Question;
use crate::safety::CandidateQuery;

/// Default bound on a single generation request.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns questions into candidate queries.
pub struct QueryGenerator {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    timeout: Duration,
}

impl QueryGenerator {
    /// Creates a generator for the given schema.
    pub fn new(client: Arc<dyn LlmClient>, schema: &Schema) -> Self {
        Self {
            client,
            system_prompt: build_system_prompt(schema),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Sets the generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The system prompt sent with every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Generates a candidate query for the question.
    ///
    /// Makes exactly one LLM call. Timeouts, provider failures and empty
    /// responses all surface as [`InsightError::Generation`].
    pub async fn generate(&self, question: &Question) -> Result<CandidateQuery> {
        let messages = build_messages(&self.system_prompt, question.as_str());
        let start = Instant::now();

        let response = tokio::time::timeout(self.timeout, self.client.complete(&messages))
            .await
            .map_err(|_| {
                InsightError::generation(format!(
                    "LLM request timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            })??;

        let sql = extract_query(&response);
        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = response.len(),
            sql_len = sql.len(),
            "LLM response received"
        );

        if sql.is_empty() {
            return Err(InsightError::generation("LLM returned an empty query"));
        }

        Ok(CandidateQuery::new(sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn generator(client: MockLlmClient) -> QueryGenerator {
        QueryGenerator::new(Arc::new(client), &Schema::records())
    }

    fn question(text: &str) -> Question {
        Question::parse(text).unwrap()
    }

    #[tokio::test]
    async fn test_generate_strips_fence() {
        let client = MockLlmClient::new().with_response("one", "```sql\nSELECT 1\n```");
        let candidate = generator(client).generate(&question("give me one")).await.unwrap();
        assert_eq!(candidate.as_str(), "SELECT 1");
    }

    #[tokio::test]
    async fn test_generate_makes_one_call() {
        let client = MockLlmClient::new();
        let generator = generator(client.clone());
        generator.generate(&question("count by race")).await.unwrap();
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_empty_response_is_error() {
        let client = MockLlmClient::new().with_response("blank", "```sql\n```");
        let err = generator(client)
            .generate(&question("blank please"))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Generation(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_generate_failure_is_not_retried() {
        let client = MockLlmClient::new().with_failure("upstream down");
        let generator = generator(client.clone());
        let err = generator.generate(&question("anything")).await.unwrap_err();
        assert_eq!(err.to_string(), "Generation error: upstream down");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_timeout() {
        let client = MockLlmClient::new().with_delay(Duration::from_millis(200));
        let generator = generator(client).with_timeout(Duration::from_millis(20));
        let err = generator.generate(&question("count")).await.unwrap_err();
        assert!(matches!(err, InsightError::Generation(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_system_prompt_includes_schema() {
        let generator = generator(MockLlmClient::new());
        assert!(generator.system_prompt().contains("Table: records"));
    }
}
