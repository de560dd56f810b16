use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid date in field '{field}': {value:?}")]
    DateParse { field: &'static str, value: Option<String> },

    #[error("Missing required field '{field}' in {source_system} record")]
    MissingField {
        source_system: &'static str,
        field: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from normalizing a single record rather than
    /// from reading a source as a whole
    pub fn is_normalization(&self) -> bool {
        matches!(
            self,
            PipelineError::DateParse { .. } | PipelineError::MissingField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
