//! State layout under `<home>/.warden/`.
//!
//! ```text
//! ~/.warden/
//!   config/   workflow TOML files
//!   daemon/   <name>.json, one per daemon
//!   logs/     <log>.log, combined watcher stdout/stderr
//! ```
//!
//! Every function here is pure: no directory is created or read.

use std::path::{Path, PathBuf};

use crate::types::DaemonName;

pub const RECORD_EXTENSION: &str = "json";
pub const LOG_EXTENSION: &str = "log";

pub fn warden_root(home: &Path) -> PathBuf {
    home.join(".warden")
}

pub fn daemon_dir(home: &Path) -> PathBuf {
    warden_root(home).join("daemon")
}

pub fn logs_dir(home: &Path) -> PathBuf {
    warden_root(home).join("logs")
}

pub fn config_dir(home: &Path) -> PathBuf {
    warden_root(home).join("config")
}

/// `<home>/.warden/daemon/<name>.json`
pub fn record_path(home: &Path, name: &DaemonName) -> PathBuf {
    daemon_dir(home).join(format!("{}.{RECORD_EXTENSION}", name.0))
}

/// `<home>/.warden/logs/<log_name>.log`
pub fn log_path(home: &Path, log_name: &str) -> PathBuf {
    logs_dir(home).join(format!("{log_name}.{LOG_EXTENSION}"))
}
