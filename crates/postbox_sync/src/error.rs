//! Error types for sync operations.

use std::path::PathBuf;
use thiserror::Error;

use postbox_manifest::ManifestError;
use postbox_remote::RemoteError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a whole command before or instead of dispatch.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("No templates or layouts were found in {0}")]
    EmptyManifest(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one dispatched entry. Captured in the report, never propagated.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to write files: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write meta file: {0}")]
    Json(#[from] serde_json::Error),
}
