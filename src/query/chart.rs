//! Chart classification from result shape.
//!
//! Infers a visualization for untyped tabular output. The first column is the
//! label axis; every other column that reads as numbers becomes a series.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::db::{Row, Value};

/// Label used for NULL first-column values.
pub const NULL_LABEL: &str = "(null)";

/// Largest row count still drawn as a pie.
const MAX_PIE_ROWS: usize = 10;

/// Inclusive year range that makes a label axis a timeline.
const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;

/// Kind of chart suited to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    None,
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Line => "line",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numeric column, positionally aligned with the labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Column index in the result.
    pub index: usize,
    /// Column header.
    pub name: String,
    /// One entry per row; `None` where the cell was NULL, blank or unparseable.
    pub values: Vec<Option<f64>>,
}

/// Chart derived from a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// A spec that draws nothing.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Classifies a result shape into a chart.
///
/// Pure: the same input always yields the same spec.
pub fn classify(columns: &[String], rows: &[Row]) -> ChartSpec {
    if rows.is_empty() || columns.is_empty() {
        return ChartSpec::none();
    }

    let numeric: Vec<usize> = (1..columns.len())
        .filter(|&index| is_numeric_column(rows, index))
        .collect();

    if numeric.is_empty() {
        return ChartSpec::none();
    }

    let labels: Vec<String> = rows.iter().map(|row| label(row.first())).collect();

    let kind = if labels.iter().all(|l| is_year(l)) {
        ChartKind::Line
    } else if columns.len() == 2 && numeric == [1] && rows.len() <= MAX_PIE_ROWS {
        ChartKind::Pie
    } else {
        ChartKind::Bar
    };

    let series = numeric
        .into_iter()
        .map(|index| Series {
            index,
            name: columns[index].clone(),
            values: rows
                .iter()
                .map(|row| row.get(index).and_then(Value::as_f64))
                .collect(),
        })
        .collect();

    ChartSpec {
        kind,
        labels,
        series,
    }
}

fn is_numeric_column(rows: &[Row], index: usize) -> bool {
    rows.iter()
        .all(|row| row.get(index).map_or(true, Value::is_numeric_or_blank))
}

fn label(cell: Option<&Value>) -> String {
    cell.and_then(Value::to_display_string)
        .unwrap_or_else(|| NULL_LABEL.to_string())
}

fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").ok()).as_ref()
}

fn is_year(label: &str) -> bool {
    let Some(pattern) = year_pattern() else {
        return false;
    };
    pattern.is_match(label)
        && label
            .parse::<u32>()
            .map(|year| YEAR_RANGE.contains(&year))
            .unwrap_or(false)
}
