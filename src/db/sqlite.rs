//! SQLite records store.
//!
//! Provides `SqliteReadStore`, which opens the records database in a
//! read-only session using sqlx.

use crate::db::{ReadStore, ResultSet, Row, Value};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Executor, Row as _, Statement as _, TypeInfo, ValueRef};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of pooled read connections.
const MAX_CONNECTIONS: u32 = 4;

/// How long a reader waits on a locked database file.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Read-only SQLite records store.
#[derive(Debug)]
pub struct SqliteReadStore {
    pool: SqlitePool,
    max_rows: usize,
}

impl SqliteReadStore {
    /// Opens the database at `path` for reading.
    ///
    /// The file is opened with `SQLITE_OPEN_READONLY` and every pooled
    /// connection runs `PRAGMA query_only = ON`, so writes fail whatever SQL
    /// reaches the store.
    pub async fn open(path: &Path, max_rows: usize) -> Result<Self> {
        if !path.exists() {
            return Err(InsightError::config(format!(
                "Records database not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(10))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("PRAGMA query_only = ON").await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                InsightError::execution(format!(
                    "Failed to open records database {}: {e}",
                    path.display()
                ))
            })?;

        info!(path = %path.display(), max_rows, "Opened records database read-only");

        Ok(Self { pool, max_rows })
    }
}

#[async_trait]
impl ReadStore for SqliteReadStore {
    async fn execute_read(&self, sql: &str) -> Result<ResultSet> {
        let start = Instant::now();

        // Columns come from the prepared statement so empty results keep their projection.
        let statement = (&self.pool)
            .prepare(sql)
            .await
            .map_err(|e| InsightError::execution(format_query_error(&e)))?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();

        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| InsightError::execution(format_query_error(&e)))?;

        let execution_time = start.elapsed();

        let total_rows = result.len();
        let was_truncated = total_rows > self.max_rows;
        if was_truncated {
            warn!(
                "Query returned {} rows, truncating to {} rows",
                total_rows, self.max_rows
            );
        }

        let rows: Vec<Row> = result
            .iter()
            .take(self.max_rows)
            .map(convert_row)
            .collect();

        debug!(
            duration_ms = execution_time.as_millis() as u64,
            row_count = rows.len(),
            column_count = columns.len(),
            "Read query finished"
        );

        Ok(ResultSet {
            columns,
            rows,
            execution_time,
            total_rows,
            was_truncated,
        })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a single cell using its runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|bytes| Value::String(format!("<{} bytes>", bytes.len())))
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Formats an engine error, preferring the database's own message.
fn format_query_error(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
