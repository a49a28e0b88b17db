//! Lifecycle operations: invoke, freeze, rekindle, slay and tally.
//!
//! Each operation is a short composition of the store, the registry, the
//! probe and the launcher. Nothing here prints; the CLI renders the returned
//! values.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use warden_core::{paths, store, DaemonName, DaemonRecord};

use crate::error::{env_err, DaemonError};
use crate::launcher;
use crate::probe::{self, ProcessState, SignalKind, SignalOutcome};
use crate::registry::{self, Resolved, Selector, Skipped};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One record a batch operation could not handle.
#[derive(Debug)]
pub struct Failure {
    /// Daemon name, or the record file path when the record was unreadable.
    pub target: String,
    pub error: DaemonError,
}

impl From<Skipped> for Failure {
    fn from(skipped: Skipped) -> Self {
        Self {
            target: skipped.path.display().to_string(),
            error: skipped.error.into(),
        }
    }
}

/// Outcome of a selector-driven operation, in enumeration order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub done: Vec<T>,
    pub failed: Vec<Failure>,
}

impl<T> BatchReport<T> {
    fn new(skipped: Vec<Skipped>) -> Self {
        Self {
            done: Vec::new(),
            failed: skipped.into_iter().map(Failure::from).collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frozen {
    pub name: DaemonName,
    pub pid: i32,
    pub outcome: SignalOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rekindled {
    pub record: DaemonRecord,
    pub previous_pid: i32,
    /// The previous watcher was still alive and is now untracked.
    pub orphaned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slain {
    pub name: DaemonName,
    pub pid: i32,
    pub outcome: SignalOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct TallyRow {
    #[serde(flatten)]
    pub record: DaemonRecord,
    pub state: ProcessState,
}

#[derive(Debug, Default)]
pub struct Tally {
    pub rows: Vec<TallyRow>,
    pub skipped: Vec<Failure>,
}

// ---------------------------------------------------------------------------
// invoke
// ---------------------------------------------------------------------------

/// Raw invoke inputs, before validation and path expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeRequest {
    pub name: String,
    pub group: String,
    pub watch_dir: String,
    pub script_path: String,
    /// Log file stem under `~/.warden/logs/`.
    pub log_name: String,
}

/// Start a new watcher and persist its record.
///
/// Rejected with [`DaemonError::Conflict`] when a live daemon already watches
/// the same directory. The record is saved only after a successful spawn.
pub fn invoke(settings: &Settings, req: &InvokeRequest) -> Result<DaemonRecord, DaemonError> {
    require("--name", &req.name)?;
    require("--watch", &req.watch_dir)?;
    require("--script", &req.script_path)?;
    require("--log", &req.log_name)?;

    let name = DaemonName::parse(req.name.as_str())
        .map_err(|err| DaemonError::Validation(err.to_string()))?;
    if req.log_name.contains('/') || req.log_name.starts_with('.') {
        return Err(DaemonError::Validation(format!(
            "invalid log name '{}': must be a plain file name",
            req.log_name
        )));
    }

    let watch_dir = expand_path(&req.watch_dir)?;
    let script_path = expand_path(&req.script_path)?;

    if let Some(existing) = registry::find_collision_at(&settings.home, &watch_dir)? {
        return Err(DaemonError::Conflict {
            name: existing.name.0,
            watch_dir,
        });
    }

    let mut record = DaemonRecord {
        name,
        group: req.group.clone(),
        watch_dir,
        script_path,
        log_path: paths::log_path(&settings.home, &req.log_name),
        pid: 0,
        invoked_at: Utc::now(),
    };
    record.pid = launcher::spawn(&settings.watcher, &record)?;
    store::save_at(&settings.home, &record)?;

    tracing::info!(daemon = %record.name, group = %record.group, pid = record.pid, "daemon invoked");
    Ok(record)
}

fn require(flag: &str, value: &str) -> Result<(), DaemonError> {
    if value.trim().is_empty() {
        return Err(DaemonError::Validation(format!("`{flag}` is required")));
    }
    Ok(())
}

/// Expand `~`, `$VAR` and `${VAR}`, then anchor relative paths at the
/// current directory. Unset variables are an error.
pub fn expand_path(raw: &str) -> Result<PathBuf, DaemonError> {
    let expanded = shellexpand::full(raw).map_err(|err| DaemonError::Expand {
        input: raw.to_string(),
        reason: err.to_string(),
    })?;
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| env_err(".", e))?;
    Ok(cwd.join(path))
}

// ---------------------------------------------------------------------------
// freeze / rekindle / slay
// ---------------------------------------------------------------------------

/// Send SIGSTOP to every selected daemon. Records are not modified.
pub fn freeze(settings: &Settings, selector: &Selector) -> Result<BatchReport<Frozen>, DaemonError> {
    for_each(settings, selector, |record| {
        let outcome = probe::signal(record.pid, SignalKind::Pause)?;
        tracing::info!(daemon = %record.name, pid = record.pid, ?outcome, "daemon frozen");
        Ok(Frozen {
            name: record.name.clone(),
            pid: record.pid,
            outcome,
        })
    })
}

/// Spawn a fresh watcher for every selected daemon and rewrite its record.
///
/// A previous watcher that is still alive is left running and untracked.
pub fn rekindle(
    settings: &Settings,
    selector: &Selector,
) -> Result<BatchReport<Rekindled>, DaemonError> {
    for_each(settings, selector, |record| {
        let previous_pid = record.pid;
        let orphaned = probe::is_alive(previous_pid);
        if orphaned {
            tracing::warn!(
                daemon = %record.name,
                pid = previous_pid,
                "previous watcher still alive; it will no longer be tracked"
            );
        }

        let mut record = record.clone();
        record.pid = launcher::spawn(&settings.watcher, &record)?;
        record.invoked_at = Utc::now();
        store::save_at(&settings.home, &record)?;

        tracing::info!(daemon = %record.name, pid = record.pid, previous_pid, "daemon rekindled");
        Ok(Rekindled {
            record,
            previous_pid,
            orphaned,
        })
    })
}

/// Terminate every selected daemon, then delete its record and its log.
pub fn slay(settings: &Settings, selector: &Selector) -> Result<BatchReport<Slain>, DaemonError> {
    for_each(settings, selector, |record| {
        let was_stopped = probe::is_stopped(record.pid);
        let outcome = probe::signal(record.pid, SignalKind::Terminate)?;
        if was_stopped && outcome == SignalOutcome::Delivered {
            // SIGTERM stays pending on a stopped process until it resumes.
            probe::signal(record.pid, SignalKind::Continue)?;
        }

        store::remove_at(&settings.home, &record.name)?;
        match std::fs::remove_file(&record.log_path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(env_err(&record.log_path, err)),
        }

        tracing::info!(daemon = %record.name, pid = record.pid, ?outcome, "daemon slain");
        Ok(Slain {
            name: record.name.clone(),
            pid: record.pid,
            outcome,
        })
    })
}

/// Resolve `selector` and apply `op` to each record.
///
/// A single-name selector returns the first error; batches record it and
/// move on to the next record.
fn for_each<T>(
    settings: &Settings,
    selector: &Selector,
    mut op: impl FnMut(&DaemonRecord) -> Result<T, DaemonError>,
) -> Result<BatchReport<T>, DaemonError> {
    let Resolved { records, skipped } = registry::resolve_at(&settings.home, selector)?;
    let mut report = BatchReport::new(skipped);

    for record in &records {
        match op(record) {
            Ok(done) => report.done.push(done),
            Err(error) if selector.is_single() => return Err(error),
            Err(error) => {
                tracing::warn!(daemon = %record.name, %error, "batch item failed");
                report.failed.push(Failure {
                    target: record.name.0.clone(),
                    error,
                });
            }
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// tally / log lookup
// ---------------------------------------------------------------------------

/// Every stored record with its observed process state. Read-only.
pub fn tally(settings: &Settings) -> Result<Tally, DaemonError> {
    let mut tally = Tally::default();
    for path in store::list_all_at(&settings.home)? {
        match store::load_path(&path) {
            Ok(record) => {
                let state = probe::state(record.pid);
                tally.rows.push(TallyRow { record, state });
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable record");
                tally.skipped.push(Skipped { path, error }.into());
            }
        }
    }
    Ok(tally)
}

/// Log file recorded for `name`.
pub fn log_file(settings: &Settings, name: &DaemonName) -> Result<PathBuf, DaemonError> {
    Ok(store::load_at(&settings.home, name)?.log_path)
}
