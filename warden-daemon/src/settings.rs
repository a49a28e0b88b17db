//! Per-invocation settings, built once by the CLI and passed by reference
//! into every lifecycle operation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_WATCH_PROGRAM: &str = "watchexec";
pub const DEFAULT_INTERPRETER: &str = "bash";

/// External watch-and-run executable and the interpreter it runs scripts with.
///
/// The child is started as
/// `<program> --watch <watch_dir> -- <interpreter> <script_path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherCommand {
    pub program: OsString,
    pub interpreter: OsString,
}

impl Default for WatcherCommand {
    fn default() -> Self {
        Self {
            program: OsString::from(DEFAULT_WATCH_PROGRAM),
            interpreter: OsString::from(DEFAULT_INTERPRETER),
        }
    }
}

impl WatcherCommand {
    pub fn new(program: impl Into<OsString>, interpreter: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            interpreter: interpreter.into(),
        }
    }

    /// Build the unspawned command for one watch/script pair.
    pub fn command(&self, watch_dir: &Path, script_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--watch")
            .arg(watch_dir)
            .arg("--")
            .arg(&self.interpreter)
            .arg(script_path);
        cmd
    }

    pub fn program_label(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Root under which `.warden/` lives.
    pub home: PathBuf,
    pub watcher: WatcherCommand,
}

impl Settings {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            watcher: WatcherCommand::default(),
        }
    }

    pub fn with_watcher(mut self, watcher: WatcherCommand) -> Self {
        self.watcher = watcher;
        self
    }
}
