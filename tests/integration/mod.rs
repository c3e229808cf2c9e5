//! Integration tests for db-insight.

pub mod common;
pub mod pipeline_test;
pub mod sqlite_test;
