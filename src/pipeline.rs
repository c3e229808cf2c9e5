//! Question answering pipeline.
//!
//! Sequences generation, validation, execution and chart classification for
//! one question. Every failure becomes a [`PipelineOutcome::Failure`] naming
//! the stage that stopped the run; nothing here panics or retries.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::{ReadStore, Row, Schema};
use crate::error::{InsightError, Result};
use crate::llm::{LlmClient, QueryGenerator};
use crate::query::{ChartSpec, QueryExecutor};
use crate::safety::QueryValidator;

/// A user question, non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Trims the text and rejects empty input.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InsightError::input("Question must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Input,
    Generate,
    Validate,
    Execute,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Generate => "generate",
            Self::Validate => "validate",
            Self::Execute => "execute",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub query_text: String,
    pub chart: ChartSpec,
    /// Set when the row cap clipped the result.
    pub truncation_warning: Option<String>,
}

/// A run that stopped early.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub message: String,
    /// The generated query, whenever generation got that far.
    pub query_text: Option<String>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success(Answer),
    Failure(PipelineFailure),
}

/// Wire shape of an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Success {
        columns: Vec<String>,
        rows: Vec<Row>,
        query_text: String,
        chart: ChartSpec,
    },
    Failure {
        error_message: String,
        stage: Stage,
        #[serde(skip_serializing_if = "Option::is_none")]
        query_text: Option<String>,
    },
}

impl PipelineOutcome {
    fn failure(stage: Stage, error: &InsightError, query_text: Option<String>) -> Self {
        Self::Failure(PipelineFailure {
            stage,
            message: error.to_string(),
            query_text,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The query text, when one was generated.
    pub fn query_text(&self) -> Option<&str> {
        match self {
            Self::Success(answer) => Some(&answer.query_text),
            Self::Failure(failure) => failure.query_text.as_deref(),
        }
    }

    /// HTTP status for this outcome.
    ///
    /// Input and validation failures are client-caused; generation failures
    /// are upstream (502) and execution failures are server-side (500).
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success(_) => StatusCode::OK,
            Self::Failure(failure) => match failure.stage {
                Stage::Input | Stage::Validate => StatusCode::BAD_REQUEST,
                Stage::Generate => StatusCode::BAD_GATEWAY,
                Stage::Execute => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Converts the outcome into its response shape.
    pub fn to_response(&self) -> AnswerResponse {
        match self {
            Self::Success(answer) => AnswerResponse::Success {
                columns: answer.columns.clone(),
                rows: answer.rows.clone(),
                query_text: answer.query_text.clone(),
                chart: answer.chart.clone(),
            },
            Self::Failure(failure) => AnswerResponse::Failure {
                error_message: failure.message.clone(),
                stage: failure.stage,
                query_text: failure.query_text.clone(),
            },
        }
    }
}

/// The question-to-answer pipeline.
///
/// Holds only shared, immutable collaborators, so one pipeline can serve
/// concurrent runs.
pub struct Pipeline {
    generator: QueryGenerator,
    validator: QueryValidator,
    executor: QueryExecutor,
}

impl Pipeline {
    /// Creates a pipeline over the records schema.
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn ReadStore>) -> Self {
        Self {
            generator: QueryGenerator::new(llm, &Schema::records()),
            validator: QueryValidator::new(),
            executor: QueryExecutor::new(store),
        }
    }

    /// Sets the bound on the LLM call.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generator = self.generator.with_timeout(timeout);
        self
    }

    /// Sets the bound on the database read.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Answers one question.
    pub async fn answer_question(&self, question: &str) -> PipelineOutcome {
        let question = match Question::parse(question) {
            Ok(q) => q,
            Err(e) => {
                warn!(stage = %Stage::Input, "{}", e);
                return PipelineOutcome::failure(Stage::Input, &e, None);
            }
        };
        info!(question_len = question.as_str().len(), "Answering question");

        let candidate = match self.generator.generate(&question).await {
            Ok(c) => c,
            Err(e) => {
                warn!(stage = %Stage::Generate, "{}", e);
                return PipelineOutcome::failure(Stage::Generate, &e, None);
            }
        };

        let validated = match self.validator.validate(&candidate) {
            Ok(v) => v,
            Err(e) => {
                warn!(stage = %Stage::Validate, sql = %candidate, "{}", e);
                return PipelineOutcome::failure(
                    Stage::Validate,
                    &e,
                    Some(candidate.into_string()),
                );
            }
        };

        let result = match self.executor.execute(&validated).await {
            Ok(r) => r,
            Err(e) => {
                warn!(stage = %Stage::Execute, sql = %validated, "{}", e);
                return PipelineOutcome::failure(
                    Stage::Execute,
                    &e,
                    Some(validated.into_string()),
                );
            }
        };

        let chart = result.chart();
        info!(
            row_count = result.row_count(),
            chart = %chart.kind,
            "Question answered"
        );

        PipelineOutcome::Success(Answer {
            truncation_warning: result.truncation_warning(),
            columns: result.columns,
            rows: result.rows,
            query_text: validated.into_string(),
            chart,
        })
    }
}
