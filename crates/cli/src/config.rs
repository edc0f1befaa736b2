//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CADASTRO_DATA_FILE` - Snapshot file the registry is loaded from and saved
//!   to (default: `banco.json`)
//! - `CADASTRO_SEED` - Seed a fresh store when the data file does not exist
//!   (default: `true`)
//! - `CADASTRO_LOG_FORMAT` - `text` or `json` (default: `text`)
//! - `RUST_LOG` - Log filter (default: `info`)

use std::path::PathBuf;
use std::str::FromStr;

use cadastro_core::Snapshot;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Snapshot file holding the registry between invocations.
    pub data_file: PathBuf,
    /// Whether a missing data file starts from the seed records.
    pub seed: bool,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_file = PathBuf::from(get_or_default(
            &lookup,
            "CADASTRO_DATA_FILE",
            Snapshot::DEFAULT_FILE_NAME,
        ));
        if data_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CADASTRO_DATA_FILE".to_string(),
                "path must not be empty".to_string(),
            ));
        }

        let seed = parse_bool(&get_or_default(&lookup, "CADASTRO_SEED", "true"))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "CADASTRO_SEED".to_string(),
                    "expected true/false, yes/no or 1/0".to_string(),
                )
            })?;

        let log_format = get_or_default(&lookup, "CADASTRO_LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("CADASTRO_LOG_FORMAT".to_string(), e))?;

        Ok(Self {
            data_file,
            seed,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
