use std::path::PathBuf;

/// Errors from dataset IO, grid search and identification.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("CSV header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("invalid search grid: {0}")]
    InvalidGrid(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("identification failed: {0}")]
    Identification(String),

    /// A file an earlier mode was supposed to produce is absent.
    #[error("missing input {0}: run the mode that produces it first")]
    MissingInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, FitError>;
