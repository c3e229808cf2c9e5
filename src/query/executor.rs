//! Validated query execution.
//!
//! Runs a [`ValidatedQuery`] through the read-only store under a timeout and
//! checks the row-width invariant before handing the result on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::{ReadStore, ResultSet};
use crate::error::{InsightError, Result};
use crate::safety::ValidatedQuery;

/// Default bound on a single read.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Query executor over a read-only store.
pub struct QueryExecutor {
    store: Arc<dyn ReadStore>,
    timeout: Duration,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Sets the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executes the query and returns its rows.
    ///
    /// Engine failures and timeouts surface as [`InsightError::Execution`].
    pub async fn execute(&self, query: &ValidatedQuery) -> Result<ResultSet> {
        let start = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.store.execute_read(query.as_str()))
            .await
            .map_err(|_| {
                InsightError::execution(format!(
                    "Query timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            })??;

        if let Some(index) = result.first_ragged_row() {
            return Err(InsightError::execution(format!(
                "Row {} has {} cells but the result has {} columns",
                index,
                result.rows[index].len(),
                result.columns.len()
            )));
        }

        let elapsed = start.elapsed();
        tracing::info!(
            duration_ms = elapsed.as_millis() as u64,
            row_count = result.row_count(),
            truncated = result.was_truncated,
            "Query executed"
        );

        Ok(result.with_execution_time(elapsed))
    }
}
