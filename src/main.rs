//! insight - answer questions about stored records in plain language.

use std::process::ExitCode;

use db_insight::cli::{Cli, OutputFormat};
use db_insight::config::Config;
use db_insight::db::{self, Schema};
use db_insight::error::{InsightError, Result};
use db_insight::llm::create_client;
use db_insight::logging::{init_file_logging, init_stderr_logging};
use db_insight::pipeline::{Answer, Pipeline, PipelineOutcome};
use tracing::{error, info};

/// Shown in text tables for NULL cells.
const NULL_CELL: &str = "NULL";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse_args();

    match &cli.log_file {
        Some(path) => init_file_logging(path),
        None => init_stderr_logging(),
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one invocation. Returns whether the question was answered.
async fn run(cli: Cli) -> Result<bool> {
    if cli.print_schema {
        println!("{}", Schema::records().format_for_llm());
        return Ok(true);
    }

    let format = cli.output_format()?;
    let question = cli.parsed_question()?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults();
    cli.apply_overrides(&mut config);

    let provider = config.llm.provider()?;
    let llm = create_client(
        provider,
        None,
        config.llm.model.clone(),
        config.llm.timeout_secs,
    )?;
    let store = db::connect(&config.database).await?;
    info!(provider = %provider, "Pipeline ready");

    let pipeline = Pipeline::new(llm, store.clone())
        .with_generation_timeout(config.llm.timeout())
        .with_query_timeout(config.database.query_timeout());

    let outcome = pipeline.answer_question(question.as_str()).await;
    store.close().await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.to_response())
                .map_err(|e| InsightError::internal(format!("Failed to encode response: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print_text(&outcome),
    }

    Ok(outcome.is_success())
}

fn print_text(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Success(answer) => {
            println!("{}", render_table(answer));
            println!();
            println!("Query: {}", answer.query_text);
            println!("Chart: {}", answer.chart.kind);
            if let Some(warning) = &answer.truncation_warning {
                println!("{warning}");
            }
        }
        PipelineOutcome::Failure(failure) => {
            eprintln!("Failed at {} stage: {}", failure.stage, failure.message);
            if let Some(sql) = &failure.query_text {
                eprintln!("Query: {sql}");
            }
        }
    }
}

fn render_table(answer: &Answer) -> String {
    let cells: Vec<Vec<String>> = answer
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.to_display_string().unwrap_or_else(|| NULL_CELL.to_string()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = answer.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&answer.columns)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(cells.iter().map(|row| format_row(row)));
    lines.push(format!("({} rows)", answer.rows.len()));
    lines.join("\n")
}
