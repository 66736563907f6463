use std::path::PathBuf;

use metasift_core::Field;
use metasift_crawl::FetchError;
use thiserror::Error;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid alias file {path}: {source}")]
    Alias {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors parsing a naming template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder {{{key}}} in \"{template}\"")]
    UnknownKey { key: String, template: String },

    #[error("unclosed '{{' in \"{0}\"")]
    Unclosed(String),

    #[error("unmatched '}}' in \"{0}\"")]
    Unmatched(String),
}

/// Arbitration failure for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    #[error("no source produced data")]
    NoData,

    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors producing a naming plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("files are kept in place but the item has no media file")]
    NoMediaFile,

    #[error("media file has no usable name: {0}")]
    BadFileName(PathBuf),
}

/// Errors setting up a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not set up source {name}: {source}")]
    Source { name: String, source: FetchError },
}
