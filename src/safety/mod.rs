//! Read-only query validation.
//!
//! Generated SQL is untrusted. It becomes a [`ValidatedQuery`] only after
//! passing the read-only allow-list in [`validator`], and the executor accepts
//! nothing else.

mod validator;

pub use validator::{validate_query, QueryValidator};

use serde::Serialize;
use std::fmt;

/// Query text produced by the LLM, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateQuery(String);

impl CandidateQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single `SELECT` statement that passed the allow-list.
///
/// Only [`QueryValidator`] can construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedQuery(String);

impl ValidatedQuery {
    pub(crate) fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
