//! Error types for manifest building.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that abort manifest construction.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("The provided path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Duplicate alias '{alias}' found in {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid meta file {path}: {message}")]
    InvalidMeta { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
