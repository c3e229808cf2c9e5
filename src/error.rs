//! Error types for db-insight.
//!
//! Defines the main error enum used throughout the question-answering pipeline.

use thiserror::Error;

/// Main error type for db-insight operations.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Missing or blank question (never reaches the generator).
    #[error("Input error: {0}")]
    Input(String),

    /// LLM failures (authentication, transport, timeouts, malformed output).
    #[error("Generation error: {0}")]
    Generation(String),

    /// Candidate query failed the read-only allow-list.
    #[error("Rejected query: {0}")]
    Rejected(String),

    /// Query execution errors (unknown column, syntax, timeouts, connection).
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates a generation error with the given message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Creates a rejected-query error with the given message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input Error",
            Self::Generation(_) => "Generation Error",
            Self::Rejected(_) => "Rejected Query",
            Self::Execution(_) => "Execution Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using InsightError.
pub type Result<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_input() {
        let err = InsightError::input("Question must not be empty");
        assert_eq!(err.to_string(), "Input error: Question must not be empty");
        assert_eq!(err.category(), "Input Error");
    }

    #[test]
    fn test_error_display_generation() {
        let err = InsightError::generation("Authentication failed. Check your OPENAI_API_KEY.");
        assert_eq!(
            err.to_string(),
            "Generation error: Authentication failed. Check your OPENAI_API_KEY."
        );
        assert_eq!(err.category(), "Generation Error");
    }

    #[test]
    fn test_error_display_rejected() {
        let err = InsightError::rejected("only SELECT statements are allowed, found DROP");
        assert_eq!(
            err.to_string(),
            "Rejected query: only SELECT statements are allowed, found DROP"
        );
        assert_eq!(err.category(), "Rejected Query");
    }

    #[test]
    fn test_error_display_execution() {
        let err = InsightError::execution("no such column: emal");
        assert_eq!(err.to_string(), "Execution error: no such column: emal");
        assert_eq!(err.category(), "Execution Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = InsightError::config("missing field 'path' in database");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'path' in database"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = InsightError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InsightError>();
    }
}
