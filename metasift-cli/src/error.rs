use std::path::PathBuf;

use metasift_core::IdentifierParseError;
use metasift_lib::{ConfigError, PipelineError};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Identifier(#[from] IdentifierParseError),

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Some items in a batch were not organized.
    #[error("{failed} of {total} item(s) were not organized")]
    Incomplete { failed: usize, total: usize },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
