//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::planner::PlannerError;
use crate::registry::RegistryError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}: {}", .0.code(), .0)]
    Config(#[from] ConfigError),

    #[error("{}: {}", .0.code(), .0.message())]
    Planner(#[from] PlannerError),

    #[error("{}: {}", .0.code(), .0)]
    Filter(#[from] FilterError),

    #[error("{}: {}", .0.code(), .0)]
    Registry(#[from] RegistryError),

    /// Query document is well-formed JSON but not a valid query
    #[error("WQ_CLI_INVALID_DOCUMENT: {0}")]
    Document(String),

    #[error("WQ_CLI_IO_ERROR: {0}")]
    Io(#[from] io::Error),

    #[error("WQ_CLI_IO_ERROR: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn document(msg: impl Into<String>) -> Self {
        CliError::Document(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Planner(e) => e.code().code(),
            CliError::Filter(e) => e.code(),
            CliError::Registry(e) => e.code(),
            CliError::Document(_) => "WQ_CLI_INVALID_DOCUMENT",
            CliError::Io(_) | CliError::Json(_) => "WQ_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
