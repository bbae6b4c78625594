//! Error types for delivery.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for delivery operations.
pub type DeliverResult<T> = Result<T, DeliverError>;

/// Errors that can occur while delivering content to a destination.
///
/// Every failure except `CommitFailure` leaves the destination
/// byte-for-byte unchanged.
#[derive(Error, Debug)]
pub enum DeliverError {
    #[error("Validation command failed ({command}): {detail}")]
    ValidationFailed { command: String, detail: String },

    #[error("Commit failed for {dest}: {message}")]
    CommitFailure { dest: PathBuf, message: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Backup failed: {0}")]
    BackupFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliverError {
    /// Map an I/O error, surfacing permission problems as their own kind.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
