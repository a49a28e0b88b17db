//! Per-daemon JSON metadata store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.warden/
//!   daemon/
//!     <name>.json        (one file per daemon, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function takes an explicit `home`; the CLI resolves it once from
//! `dirs::home_dir()`. Tests always pass a `TempDir`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, StoreError};
use crate::paths::{daemon_dir, record_path, RECORD_EXTENSION};
use crate::types::{DaemonName, DaemonRecord};

// ---------------------------------------------------------------------------
// 1. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `record` to `<home>/.warden/daemon/<name>.json`,
/// overwriting any previous record with the same name.
///
/// Write flow: serialize → `.json.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, record: &DaemonRecord) -> Result<(), StoreError> {
    let name = DaemonName::parse(record.name.0.clone())?;
    ensure_daemon_dir(home)?;

    let path = record_path(home, &name);
    let tmp_path = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));

    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&tmp_path, json).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the record for `name`.
///
/// Returns `StoreError::NotFound` if absent, `StoreError::Corrupt` if the
/// file does not parse.
pub fn load_at(home: &Path, name: &DaemonName) -> Result<DaemonRecord, StoreError> {
    let path = record_path(home, name);
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse(&path, &contents),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
            name: name.0.clone(),
            path,
        }),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Load a record from a path returned by [`list_all_at`].
pub fn load_path(path: &Path) -> Result<DaemonRecord, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse(path, &contents)
}

/// A record is only valid under its own file name: the `name` field must be
/// a safe storage key equal to the file stem.
fn parse(path: &Path, contents: &str) -> Result<DaemonRecord, StoreError> {
    let corrupt = |source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    };
    let record: DaemonRecord = serde_json::from_str(contents).map_err(corrupt)?;

    let stem = name_from_path(path);
    let safe = DaemonName::parse(record.name.0.as_str()).is_ok();
    if !safe || stem.as_ref() != Some(&record.name) {
        return Err(corrupt(serde::de::Error::custom(format!(
            "name field '{}' does not match file name",
            record.name
        ))));
    }
    Ok(record)
}

// ---------------------------------------------------------------------------
// 3. Enumerate
// ---------------------------------------------------------------------------

/// Every `*.json` record file in the store, sorted by file name.
///
/// An absent or empty directory yields an empty list.
pub fn list_all_at(home: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let dir = daemon_dir(home);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(io_err(dir, err)),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|x| x.to_str()) == Some(RECORD_EXTENSION))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Daemon name implied by a record path (`.../helix.json` → `helix`).
pub fn name_from_path(path: &Path) -> Option<DaemonName> {
    path.file_stem()
        .map(|stem| DaemonName::from(stem.to_string_lossy().into_owned()))
}

// ---------------------------------------------------------------------------
// 4. Remove
// ---------------------------------------------------------------------------

/// Delete the record for `name`. Removing an absent record is a no-op.
pub fn remove_at(home: &Path, name: &DaemonName) -> Result<(), StoreError> {
    let path = record_path(home, name);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn ensure_daemon_dir(home: &Path) -> Result<PathBuf, StoreError> {
    let dir = daemon_dir(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
