//! Mock records store for testing.
//!
//! Returns canned result sets keyed by SQL substrings.

use super::{ReadStore, ResultSet};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A mock store that returns predefined results.
#[derive(Debug, Clone, Default)]
pub struct MockReadStore {
    /// Canned results (SQL substring -> result).
    results: Vec<(String, ResultSet)>,
    /// When set, every read fails with this message.
    failure: Option<String>,
    /// Artificial latency before answering.
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    last_sql: Arc<Mutex<Option<String>>>,
}

impl MockReadStore {
    /// Creates a store that answers every read with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned result returned when the SQL contains `pattern` (case-insensitive).
    pub fn with_result(mut self, pattern: impl Into<String>, result: ResultSet) -> Self {
        self.results.push((pattern.into(), result));
        self
    }

    /// Makes every read fail with the given engine message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Delays every read by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many reads were executed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the SQL of the most recent read.
    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ReadStore for MockReadStore {
    async fn execute_read(&self, sql: &str) -> Result<ResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_sql.lock() {
            *last = Some(sql.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(InsightError::execution(message.clone()));
        }

        let sql_lower = sql.to_lowercase();
        let result = self
            .results
            .iter()
            .find(|(pattern, _)| sql_lower.contains(&pattern.to_lowercase()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default();

        Ok(result)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
