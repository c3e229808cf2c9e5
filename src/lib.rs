//! db-insight - natural-language questions over stored records.
//!
//! A question is turned into SQL by an LLM, checked against a read-only
//! allow-list, run on a read-only SQLite session, and the result shape is
//! classified for charting. See [`pipeline::Pipeline`].

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod safety;
