//! Process liveness probing and signal delivery.
//!
//! Liveness is decided by sending the null signal: delivery or `EPERM` means
//! the pid is occupied, `ESRCH` means it is gone. Stopped/running is read
//! from the OS process table instead, since signal 0 cannot tell them apart.
//!
//! Pids `<= 0` are never passed to `kill(2)`: 0 and -1 address whole process
//! groups.

use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serde::Serialize;

use crate::error::DaemonError;

/// Observed state of a daemon's process. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Stopped,
    Dead,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "running"),
            ProcessState::Stopped => write!(f, "stopped"),
            ProcessState::Dead => write!(f, "dead"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// SIGSTOP
    Pause,
    /// SIGCONT
    Continue,
    /// SIGTERM
    Terminate,
}

impl SignalKind {
    fn as_signal(self) -> Signal {
        match self {
            SignalKind::Pause => Signal::SIGSTOP,
            SignalKind::Continue => Signal::SIGCONT,
            SignalKind::Terminate => Signal::SIGTERM,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_signal().as_str())
    }
}

/// Result of a successful [`signal`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Delivered,
    /// The process no longer exists; nothing was sent.
    AlreadyGone,
}

/// Whether `pid` refers to an existing process.
///
/// A permission failure counts as alive: the pid is occupied by a process
/// owned by someone else.
pub fn is_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    match kill(Pid::from_raw(pid), None::<Signal>) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Whether the OS reports `pid` as stopped (SIGSTOP'd or traced).
pub fn is_stopped(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    matches!(os_state(pid), Some(OsState::Stopped))
}

/// Combined liveness and run state, as shown by `tally`.
pub fn state(pid: i32) -> ProcessState {
    if !is_alive(pid) {
        return ProcessState::Dead;
    }
    match os_state(pid) {
        Some(OsState::Stopped) => ProcessState::Stopped,
        Some(OsState::Zombie) => ProcessState::Dead,
        Some(OsState::Other) | None => ProcessState::Running,
    }
}

/// Send `kind` to `pid`.
///
/// A process that no longer exists is reported as
/// [`SignalOutcome::AlreadyGone`], not as an error.
pub fn signal(pid: i32, kind: SignalKind) -> Result<SignalOutcome, DaemonError> {
    if pid <= 0 {
        return Ok(SignalOutcome::AlreadyGone);
    }
    match kill(Pid::from_raw(pid), kind.as_signal()) {
        Ok(()) => {
            tracing::debug!(pid, signal = %kind, "signal delivered");
            Ok(SignalOutcome::Delivered)
        }
        Err(Errno::ESRCH) => {
            tracing::debug!(pid, signal = %kind, "process already gone");
            Ok(SignalOutcome::AlreadyGone)
        }
        Err(source) => Err(DaemonError::Signal {
            pid,
            signal: kind,
            source,
        }),
    }
}

// ---------------------------------------------------------------------------
// OS process table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OsState {
    Stopped,
    Zombie,
    Other,
}

#[cfg(target_os = "linux")]
fn os_state(pid: i32) -> Option<OsState> {
    use procfs::process::{ProcState, Process};

    let state = Process::new(pid).ok()?.stat().ok()?.state().ok()?;
    Some(match state {
        ProcState::Stopped | ProcState::Tracing => OsState::Stopped,
        ProcState::Zombie | ProcState::Dead => OsState::Zombie,
        _ => OsState::Other,
    })
}

#[cfg(not(target_os = "linux"))]
fn os_state(pid: i32) -> Option<OsState> {
    let output = std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", &pid.to_string()])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stat = String::from_utf8_lossy(&output.stdout);
    Some(match stat.trim().chars().next()? {
        'T' => OsState::Stopped,
        'Z' => OsState::Zombie,
        _ => OsState::Other,
    })
}
