//! Detached watcher spawning.
//!
//! The watcher runs in its own session with stdin on `/dev/null` and both
//! output streams appended to the daemon's log file. The `Child` handle is
//! dropped right after spawn: the supervisor never waits on or reaps it.

use std::fs::{self, OpenOptions};
use std::os::unix::process::CommandExt;
use std::process::Stdio;

use nix::unistd::setsid;
use warden_core::DaemonRecord;

use crate::error::{env_err, DaemonError};
use crate::settings::WatcherCommand;

/// Start the watcher for `record` and return its pid.
///
/// Fails with [`DaemonError::Environment`] when the log cannot be prepared
/// and [`DaemonError::Spawn`] when the watch program cannot be started.
/// Exactly one child is created per successful call; nothing is retried.
pub fn spawn(watcher: &WatcherCommand, record: &DaemonRecord) -> Result<i32, DaemonError> {
    if let Some(log_dir) = record.log_path.parent() {
        fs::create_dir_all(log_dir).map_err(|e| env_err(log_dir, e))?;
    }

    let stdout_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&record.log_path)
        .map_err(|e| env_err(&record.log_path, e))?;
    let stderr_log = stdout_log
        .try_clone()
        .map_err(|e| env_err(&record.log_path, e))?;

    let mut cmd = watcher.command(&record.watch_dir, &record.script_path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log));

    // Child side: leave the supervisor's session and controlling terminal.
    unsafe {
        cmd.pre_exec(|| {
            let _ = setsid();
            Ok(())
        });
    }

    let child = cmd.spawn().map_err(|source| DaemonError::Spawn {
        program: watcher.program_label(),
        source,
    })?;
    let pid = child.id() as i32;
    drop(child);

    tracing::debug!(
        daemon = %record.name,
        pid,
        watch = %record.watch_dir.display(),
        log = %record.log_path.display(),
        "watcher spawned"
    );
    Ok(pid)
}
