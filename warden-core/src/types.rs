//! Domain types for the daemon metadata store.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Records serialize to JSON with camelCase keys in declaration order.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed daemon name. Doubles as the record's file stem, so it
/// may not contain path separators or start with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaemonName(pub String);

impl DaemonName {
    /// Validate `raw` as a storage-safe daemon name.
    pub fn parse(raw: impl Into<String>) -> Result<Self, StoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(StoreError::InvalidName(raw));
        }
        if raw.starts_with('.') || raw.contains('/') || raw.contains('\\') || raw.contains('\0') {
            return Err(StoreError::InvalidName(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DaemonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DaemonName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DaemonName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Persisted metadata for one watcher daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonRecord {
    pub name: DaemonName,
    /// Batch-selection label; empty when the daemon belongs to no group.
    #[serde(default)]
    pub group: String,
    pub watch_dir: PathBuf,
    pub script_path: PathBuf,
    pub log_path: PathBuf,
    /// Pid of the most recent spawn. `<= 0` means never spawned.
    #[serde(default)]
    pub pid: i32,
    pub invoked_at: DateTime<Utc>,
}

impl DaemonRecord {
    /// Whether this record carries a pid that could refer to a live process.
    pub fn has_pid(&self) -> bool {
        self.pid > 0
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group == group
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
