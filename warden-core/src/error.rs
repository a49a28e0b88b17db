//! Error types for warden-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from metadata store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record file exists for the requested daemon.
    #[error("no daemon named '{name}' (expected {path})")]
    NotFound { name: String, path: PathBuf },

    /// The record file exists but does not deserialize into a `DaemonRecord`.
    #[error("corrupt daemon record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Directory creation, write, rename, or delete failed.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("failed to encode daemon record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The daemon name cannot be used as a storage key.
    #[error("invalid daemon name '{0}': must be non-empty, without path separators or a leading '.'")]
    InvalidName(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Convenience constructor for [`StoreError::Storage`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Storage {
        path: path.into(),
        source,
    }
}
