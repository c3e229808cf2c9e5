//! Result set types for db-insight.
//!
//! Defines the structures used to represent rows read from the records store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::query::{classify, ChartSpec};

/// Rows and column names produced by executing a validated query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    /// Column names in projection order.
    pub columns: Vec<String>,

    /// Rows of data, each with exactly `columns.len()` cells.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    #[serde(with = "duration_serde")]
    pub execution_time: Duration,

    /// Total number of rows before truncation.
    pub total_rows: usize,

    /// Whether the result was truncated to the configured row cap.
    #[serde(default)]
    pub was_truncated: bool,
}

impl ResultSet {
    /// Creates a result set with the given columns and rows.
    pub fn with_data(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let total_rows = rows.len();
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
            total_rows,
            was_truncated: false,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows held.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of the first row whose width differs from the column count.
    pub fn first_ragged_row(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.len() != self.columns.len())
    }

    /// Classifies the result shape for charting.
    pub fn chart(&self) -> ChartSpec {
        classify(&self.columns, &self.rows)
    }

    /// Returns a truncation warning message if the result was truncated.
    pub fn truncation_warning(&self) -> Option<String> {
        if self.was_truncated {
            Some(format!(
                "Result truncated: showing {} of {} rows",
                self.rows.len(),
                self.total_rows
            ))
        } else {
            None
        }
    }
}

/// A row of data from a result set.
pub type Row = Vec<Value>;

/// A single scalar cell.
///
/// Serializes as a bare JSON scalar (`null`, number or string).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Signed integer.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    String(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric reading of this cell.
    ///
    /// Text is trimmed before parsing; NULL, blank and unparseable text yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Returns true if the cell is NULL, blank, or parses as a number.
    pub fn is_numeric_or_blank(&self) -> bool {
        match self {
            Value::Null | Value::Int(_) | Value::Float(_) => true,
            Value::String(s) => s.trim().is_empty() || s.trim().parse::<f64>().is_ok(),
        }
    }

    /// Converts the value to its display string, or `None` for NULL.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_display_string() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "NULL"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Serde support for Duration (serialized as milliseconds).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
