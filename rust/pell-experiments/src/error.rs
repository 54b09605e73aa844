use std::path::PathBuf;

use pell_core::PellError;

/// Errors surfaced by the experiment runners.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Pell(#[from] PellError),

    /// A file an earlier mode was supposed to produce is absent.
    #[error("missing input {0}: run the mode that produces it first")]
    MissingInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
