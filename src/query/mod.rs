//! Query execution and result classification for db-insight.
//!
//! This module isolates SQL execution and chart inference from the
//! pipeline orchestrator.

pub mod chart;
pub mod executor;

pub use chart::{classify, ChartKind, ChartSpec, Series, NULL_LABEL};
pub use executor::QueryExecutor;
