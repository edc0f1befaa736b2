//! CLI error type.

use std::path::PathBuf;

use cadastro_core::{ServiceError, SnapshotError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end a CLI invocation with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing command output failed.
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Invalid username or password")]
    InvalidCredentials,
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
