//! Configuration management for db-insight.
//!
//! Handles loading configuration from TOML files and environment variables.
//! Precedence is CLI flags, then the config file, then the environment, then
//! built-in defaults; CLI overrides are applied by the binary.

use crate::error::{InsightError, Result};
use crate::llm::LlmProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the records database file.
pub const DATABASE_ENV: &str = "INSIGHT_DATABASE";

/// Environment variable naming the LLM provider.
pub const PROVIDER_ENV: &str = "INSIGHT_LLM_PROVIDER";

/// Main configuration structure for db-insight.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Records database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// LLM provider: "openai", "anthropic" or "mock".
    #[serde(default)]
    pub provider: Option<String>,

    /// Model name; the provider default is used when unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Bound on a single generation request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Resolves the configured provider, defaulting to OpenAI.
    pub fn provider(&self) -> Result<LlmProvider> {
        match &self.provider {
            Some(name) => name.parse(),
            None => Ok(LlmProvider::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Records database configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to the SQLite records file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Bound on a single read.
    #[serde(default = "default_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Rows kept from a single result.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_max_rows() -> usize {
    1000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            query_timeout_secs: default_timeout_secs(),
            max_rows: default_max_rows(),
        }
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-insight")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| InsightError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            InsightError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Fills settings the file left unset from the environment.
    pub fn apply_env_defaults(&mut self) {
        if self.database.path.is_none() {
            self.database.path = std::env::var_os(DATABASE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }
        if self.llm.provider.is_none() {
            self.llm.provider = std::env::var(PROVIDER_ENV).ok().filter(|v| !v.is_empty());
        }
    }
}
