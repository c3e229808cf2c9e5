//! Shared fixtures: a seeded records database in a temp directory.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// (name, value JSON, created_at)
pub const RECORDS: &[(&str, &str, &str)] = &[
    (
        "Ada",
        r#"{"birth_date":"2000-06-16","gender":"Female","race":"White","ethnicity":"Not Hispanic or Latino","city":"Denver"}"#,
        "2020-03-01T10:00:00Z",
    ),
    (
        "Ben",
        r#"{"birth_date":"1985-01-20","gender":"Male","race":"Asian","ethnicity":"Not Hispanic or Latino","city":"Austin"}"#,
        "2020-07-15T08:30:00Z",
    ),
    (
        "Cleo",
        r#"{"birth_date":"1992-11-02","gender":"Female","race":"White","ethnicity":"Hispanic or Latino","city":"Denver"}"#,
        "2021-02-11T17:45:00Z",
    ),
    (
        "Dev",
        r#"{"birth_date":"1978-09-30","gender":"Other","race":"Black or African American","ethnicity":"Not Hispanic or Latino","city":"Boston"}"#,
        "2021-05-05T12:00:00Z",
    ),
    (
        "Eli",
        r#"{"birth_date":"2003-12-31","gender":"Male","race":"White","ethnicity":"Hispanic or Latino","city":"Austin"}"#,
        "2022-01-01T00:00:00Z",
    ),
];

/// A seeded database file that lives as long as this value.
pub struct SeededDb {
    _dir: TempDir,
    path: PathBuf,
}

impl SeededDb {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates the records table and inserts [`RECORDS`] through a writable pool.
pub async fn seeded_records() -> SeededDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (name, value, created_at) in RECORDS {
        sqlx::query("INSERT INTO records (name, value, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(value)
            .bind(created_at)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;

    SeededDb { _dir: dir, path }
}
