use std::path::PathBuf;

use thiserror::Error;

use crate::probe::SignalKind;

/// Exit status for an invoke rejected by an already-active watch.
pub const EXIT_CONFLICT: u8 = 2;
/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Error surface for probing, launching, and lifecycle operations.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Store(#[from] warden_core::StoreError),

    /// Log directory or log file could not be prepared.
    #[error("environment error at {path}: {source}")]
    Environment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot expand '{input}': {reason}")]
    Expand { input: String, reason: String },

    #[error("failed to start watcher '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send {signal} to pid {pid}: {source}")]
    Signal {
        pid: i32,
        signal: SignalKind,
        #[source]
        source: nix::Error,
    },

    #[error("{0}")]
    Validation(String),

    #[error("daemon '{name}' is already watching {watch_dir}")]
    Conflict { name: String, watch_dir: PathBuf },
}

impl DaemonError {
    /// Process exit status the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DaemonError::Conflict { .. } => EXIT_CONFLICT,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaemonError::Store(err) if err.is_not_found())
    }
}

pub(crate) fn env_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Environment {
        path: path.into(),
        source,
    }
}
