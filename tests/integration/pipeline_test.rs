//! End-to-end pipeline tests: mock LLM, real read-only SQLite.

use db_insight::config::DatabaseConfig;
use db_insight::db::{self, Value};
use db_insight::llm::MockLlmClient;
use db_insight::pipeline::{Pipeline, PipelineOutcome, Stage};
use db_insight::query::ChartKind;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use super::common::{seeded_records, SeededDb};

async fn pipeline(db: &SeededDb, llm: MockLlmClient) -> Pipeline {
    let config = DatabaseConfig {
        path: Some(db.path().to_path_buf()),
        ..DatabaseConfig::default()
    };
    let store = db::connect(&config).await.unwrap();
    Pipeline::new(Arc::new(llm), store)
}

#[tokio::test]
async fn test_counts_by_race_make_pie() {
    let db = seeded_records().await;
    let pipeline = pipeline(&db, MockLlmClient::new()).await;

    let outcome = pipeline.answer_question("How many records by race?").await;

    let PipelineOutcome::Success(answer) = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(answer.columns, vec!["Race", "Count"]);
    assert_eq!(answer.rows[0], vec![Value::from("White"), Value::Int(3)]);
    assert_eq!(answer.chart.kind, ChartKind::Pie);
    assert_eq!(answer.chart.series[0].values.iter().flatten().sum::<f64>(), 5.0);
    assert_eq!(outcome.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_counts_by_year_make_line() {
    let db = seeded_records().await;
    let pipeline = pipeline(&db, MockLlmClient::new()).await;

    let outcome = pipeline.answer_question("records per year").await;

    let PipelineOutcome::Success(answer) = outcome else {
        panic!("expected success");
    };
    assert_eq!(answer.chart.kind, ChartKind::Line);
    assert_eq!(answer.chart.labels, vec!["2020", "2021", "2022"]);
    assert_eq!(
        answer.chart.series[0].values,
        vec![Some(2.0), Some(2.0), Some(1.0)]
    );
}

#[tokio::test]
async fn test_three_column_breakdown_makes_bar() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new().with_response(
        "race and ethnicity",
        "```sql\nSELECT json_extract(value, '$.race') AS Race,\n       json_extract(value, '$.ethnicity') AS Ethnicity,\n       COUNT(*) AS Count\nFROM records\nGROUP BY Race, Ethnicity\nORDER BY Race, Ethnicity;\n```",
    );
    let pipeline = pipeline(&db, llm).await;

    let outcome = pipeline
        .answer_question("Break down records by race and ethnicity")
        .await;

    let PipelineOutcome::Success(answer) = outcome else {
        panic!("expected success");
    };
    assert_eq!(answer.columns, vec!["Race", "Ethnicity", "Count"]);
    assert_eq!(answer.rows.len(), 4);
    assert_eq!(answer.chart.kind, ChartKind::Bar);
}

#[tokio::test]
async fn test_fenced_query_with_trailing_explanation() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new().with_response(
        "explain",
        "```sql\nSELECT COUNT(*) FROM records\n```\nThis counts every record.",
    );
    let pipeline = pipeline(&db, llm).await;

    let outcome = pipeline.answer_question("explain the record count").await;

    let PipelineOutcome::Success(answer) = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(answer.query_text, "SELECT COUNT(*) FROM records");
    assert_eq!(answer.rows, vec![vec![Value::Int(5)]]);
}

#[tokio::test]
async fn test_text_only_result_has_no_chart() {
    let db = seeded_records().await;
    let pipeline = pipeline(&db, MockLlmClient::new()).await;

    let outcome = pipeline.answer_question("list all records").await;

    let PipelineOutcome::Success(answer) = outcome else {
        panic!("expected success");
    };
    // name is text, so nothing is plottable.
    assert_eq!(answer.columns, vec!["id", "name"]);
    assert_eq!(answer.chart.kind, ChartKind::None);
}

#[tokio::test]
async fn test_chained_statement_is_rejected() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new().with_response("sneaky", "SELECT 1; DROP TABLE records");
    let pipeline = pipeline(&db, llm).await;

    let outcome = pipeline.answer_question("something sneaky").await;

    let PipelineOutcome::Failure(failure) = &outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::Validate);
    assert_eq!(
        failure.query_text.as_deref(),
        Some("SELECT 1; DROP TABLE records")
    );

    // The table is still there.
    let outcome = pipeline.answer_question("how many records?").await;
    let PipelineOutcome::Success(answer) = outcome else {
        panic!("expected success");
    };
    assert_eq!(answer.rows, vec![vec![Value::Int(5)]]);
}

#[tokio::test]
async fn test_execution_failure_returns_query() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new().with_response("oldest", "SELECT MAX(age) FROM records");
    let pipeline = pipeline(&db, llm).await;

    let outcome = pipeline.answer_question("Who is oldest?").await;

    let PipelineOutcome::Failure(failure) = &outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::Execute);
    assert_eq!(failure.query_text.as_deref(), Some("SELECT MAX(age) FROM records"));
    assert!(failure.message.contains("no such column"));
    assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_blank_question_skips_generation() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new();
    let pipeline = pipeline(&db, llm.clone()).await;

    let outcome = pipeline.answer_question("\n   \t").await;

    let PipelineOutcome::Failure(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::Input);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_generation_timeout() {
    let db = seeded_records().await;
    let llm = MockLlmClient::new().with_delay(Duration::from_millis(300));
    let pipeline = pipeline(&db, llm)
        .await
        .with_generation_timeout(Duration::from_millis(30));

    let outcome = pipeline.answer_question("how many records?").await;

    let PipelineOutcome::Failure(failure) = &outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::Generate);
    assert!(failure.message.contains("timed out"));
    assert_eq!(failure.query_text, None);
    assert_eq!(outcome.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_json_response_uses_bare_cells() {
    let db = seeded_records().await;
    let pipeline = pipeline(&db, MockLlmClient::new()).await;

    let outcome = pipeline.answer_question("records by gender").await;
    let json = serde_json::to_value(outcome.to_response()).unwrap();

    assert_eq!(json["columns"], serde_json::json!(["Gender", "Count"]));
    assert!(json["rows"][0][1].is_number());
    assert_eq!(json["chart"]["kind"], "pie");
    assert!(json.get("error_message").is_none());
}

#[tokio::test]
async fn test_missing_database_path_is_config_error() {
    let result = db::connect(&DatabaseConfig::default()).await;
    assert!(result.is_err());
    let err = result.err().unwrap();
    assert!(err.to_string().contains("INSIGHT_DATABASE"));
}
