//! Read-only allow-list for generated SQL.
//!
//! Uses the sqlparser-rs tokenizer with the SQLite dialect so that string
//! literals and comments are understood, but does not build an AST. The
//! execution session is read-only as well; this check alone is not relied on.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use crate::error::{InsightError, Result};

use super::{CandidateQuery, ValidatedQuery};

/// The only leading keyword a candidate may start with.
const ALLOWED_KEYWORD: &str = "SELECT";

/// Checks candidates against the read-only allow-list.
#[derive(Debug)]
pub struct QueryValidator {
    dialect: SQLiteDialect,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Validates a candidate query.
    ///
    /// Accepts exactly one statement whose first keyword is `SELECT`. A single
    /// trailing semicolon is tolerated and stripped.
    pub fn validate(&self, candidate: &CandidateQuery) -> Result<ValidatedQuery> {
        let text = candidate.as_str().trim();
        if text.is_empty() {
            return Err(InsightError::rejected("the generated query is empty"));
        }

        let tokens = Tokenizer::new(&self.dialect, text)
            .tokenize()
            .map_err(|e| InsightError::rejected(format!("could not tokenize query: {e}")))?;

        let mut significant = tokens.iter().filter(|t| is_significant(t));

        match significant.next() {
            Some(Token::Word(word))
                if word.quote_style.is_none()
                    && word.value.eq_ignore_ascii_case(ALLOWED_KEYWORD) => {}
            Some(other) => {
                return Err(InsightError::rejected(format!(
                    "only {ALLOWED_KEYWORD} statements are allowed, found {}",
                    describe_token(other)
                )));
            }
            None => return Err(InsightError::rejected("the generated query is empty")),
        }

        // Anything significant after a semicolon is a second statement.
        let mut seen_semicolon = false;
        for token in significant {
            if seen_semicolon {
                return Err(InsightError::rejected(
                    "multiple statements are not allowed",
                ));
            }
            if matches!(token, Token::SemiColon) {
                seen_semicolon = true;
            }
        }

        let sql = text
            .strip_suffix(';')
            .map(str::trim_end)
            .unwrap_or(text);

        debug!(sql_len = sql.len(), "Query passed read-only allow-list");
        Ok(ValidatedQuery::new(sql))
    }
}

/// Convenience function to validate without creating a validator instance.
pub fn validate_query(candidate: &CandidateQuery) -> Result<ValidatedQuery> {
    QueryValidator::new().validate(candidate)
}

fn is_significant(token: &Token) -> bool {
    !matches!(token, Token::Whitespace(_) | Token::EOF)
}

fn describe_token(token: &Token) -> String {
    match token {
        Token::Word(word) if word.quote_style.is_none() => word.value.to_uppercase(),
        other => format!("'{other}'"),
    }
}
