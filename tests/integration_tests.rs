//! Integration tests for db-insight.
//!
//! These tests build throwaway SQLite records databases in temp directories
//! and never touch the network.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
