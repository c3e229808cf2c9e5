//! Command-line argument parsing for db-insight.

use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::pipeline::Question;
use clap::Parser;
use std::path::PathBuf;

/// How the outcome is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table followed by the query and chart kind.
    #[default]
    Text,
    /// The JSON response shape.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Ask questions about stored records in plain language.
#[derive(Parser, Debug)]
#[command(name = "insight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The question to answer
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Path to the SQLite records database
    #[arg(short = 'd', long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider to use: openai, anthropic or mock
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<String>,

    /// Model name (provider default otherwise)
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the schema description given to the LLM and exit
    #[arg(long)]
    pub print_schema: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the parsed output format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output.parse().map_err(InsightError::config)
    }

    /// Returns the question argument, trimmed and checked for emptiness.
    ///
    /// Runs before any provider or database setup so a bad question is
    /// reported as an input error.
    pub fn parsed_question(&self) -> Result<Question> {
        let text = self
            .question
            .as_deref()
            .ok_or_else(|| InsightError::input("No question given. Pass one as an argument."))?;
        Question::parse(text)
    }

    /// Applies CLI flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database.path = Some(path.clone());
        }
        if let Some(provider) = &self.llm {
            config.llm.provider = Some(provider.clone());
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
    }
}
