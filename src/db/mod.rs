//! Storage layer for db-insight.
//!
//! Provides a trait-based, read-only interface to the records store, allowing
//! the pipeline to run against SQLite or an in-memory mock interchangeably.

mod mock;
mod schema;
mod sqlite;
mod types;

pub use mock::MockReadStore;
pub use schema::{Column, JsonField, Schema, BIRTH_DATE_FIELD, JSON_COLUMN, RECORDS_TABLE};
pub use sqlite::SqliteReadStore;
pub use types::{ResultSet, Row, Value};

use crate::config::DatabaseConfig;
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Opens the read-only records store described by the configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn ReadStore>> {
    let path = config.path.as_ref().ok_or_else(|| {
        InsightError::config("No records database configured. Use --database or set INSIGHT_DATABASE.")
    })?;
    let store = SqliteReadStore::open(path, config.max_rows).await?;
    Ok(Arc::new(store))
}

/// Read-only access to stored records.
///
/// Implementations must refuse writes regardless of the SQL text they are given.
#[async_trait]
pub trait ReadStore: Send + Sync {
    /// Executes a single read statement and returns its columns and rows.
    async fn execute_read(&self, sql: &str) -> Result<ResultSet>;

    /// Closes the underlying connections.
    async fn close(&self) -> Result<()>;
}
