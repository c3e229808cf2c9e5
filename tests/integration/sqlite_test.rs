//! Read-only SQLite store tests against a seeded records database.

use db_insight::db::{ReadStore, Schema, SqliteReadStore, Value};
use db_insight::error::InsightError;
use pretty_assertions::assert_eq;

use super::common::{seeded_records, RECORDS};

#[tokio::test]
async fn test_group_by_json_field() {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 1000).await.unwrap();

    let result = store
        .execute_read(
            "SELECT json_extract(value, '$.race') AS Race, COUNT(*) AS Count \
             FROM records GROUP BY Race ORDER BY Count DESC, Race",
        )
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["Race", "Count"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::from("White"), Value::Int(3)],
            vec![Value::from("Asian"), Value::Int(1)],
            vec![Value::from("Black or African American"), Value::Int(1)],
        ]
    );
    assert!(!result.was_truncated);
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_result_keeps_projection() {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 1000).await.unwrap();

    let result = store
        .execute_read("SELECT name AS Name, id AS Id FROM records WHERE id < 0")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["Name", "Id"]);
    assert!(result.is_empty());
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_insert_is_rejected_by_session() {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 1000).await.unwrap();

    let result = store
        .execute_read(
            "INSERT INTO records (name, value, created_at) VALUES ('Mal', '{}', '2024-01-01')",
        )
        .await;
    assert!(matches!(result, Err(InsightError::Execution(_))));

    let result = store.execute_read("DROP TABLE records").await;
    assert!(matches!(result, Err(InsightError::Execution(_))));

    let count = store
        .execute_read("SELECT COUNT(*) FROM records")
        .await
        .unwrap();
    assert_eq!(count.rows, vec![vec![Value::Int(RECORDS.len() as i64)]]);
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_row_cap_truncates() {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 2).await.unwrap();

    let result = store
        .execute_read("SELECT name FROM records ORDER BY id")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 2);
    assert_eq!(result.total_rows, RECORDS.len());
    assert!(result.was_truncated);
    assert_eq!(
        result.truncation_warning().as_deref(),
        Some("Result truncated: showing 2 of 5 rows")
    );
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_column_is_execution_error() {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 1000).await.unwrap();

    let err = store
        .execute_read("SELECT age FROM records")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no such column"));
    store.close().await.unwrap();
}

async fn age_at(reference: &str) -> Value {
    let db = seeded_records().await;
    let store = SqliteReadStore::open(db.path(), 1000).await.unwrap();
    let sql = format!(
        "SELECT {} AS age FROM records WHERE name = 'Ada'",
        Schema::age_expression(reference)
    );
    let result = store.execute_read(&sql).await.unwrap();
    store.close().await.unwrap();
    result.rows[0][0].clone()
}

#[tokio::test]
async fn test_age_day_before_birthday() {
    assert_eq!(age_at("'2024-06-15'").await, Value::Int(23));
}

#[tokio::test]
async fn test_age_on_birthday() {
    assert_eq!(age_at("'2024-06-16'").await, Value::Int(24));
}

#[tokio::test]
async fn test_age_relative_to_now_is_whole_years() {
    let value = age_at("'now'").await;
    let Value::Int(age) = value else {
        panic!("expected integer age, got {value:?}");
    };
    assert!(age >= 24);
}
