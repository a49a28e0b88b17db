//! Selector resolution and the invoke-time collision check.

use std::fmt;
use std::path::{Path, PathBuf};

use warden_core::{store, DaemonName, DaemonRecord, StoreError};

use crate::probe;

/// Targeting mode for freeze, rekindle and slay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Name(DaemonName),
    Group(String),
    All,
}

impl Selector {
    /// Single-name selectors abort on the first failure; batches continue.
    pub fn is_single(&self) -> bool {
        matches!(self, Selector::Name(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "daemon '{name}'"),
            Selector::Group(group) => write!(f, "group '{group}'"),
            Selector::All => f.write_str("all daemons"),
        }
    }
}

/// A record file that could not be loaded during enumeration.
#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub error: StoreError,
}

/// Records matched by a selector, in enumeration order.
#[derive(Debug, Default)]
pub struct Resolved {
    pub records: Vec<DaemonRecord>,
    pub skipped: Vec<Skipped>,
}

/// Resolve `selector` against the store under `home`.
///
/// A name that is absent or unreadable is an error. Group and all selectors
/// never fail on an individual file: unreadable records land in `skipped`.
pub fn resolve_at(home: &Path, selector: &Selector) -> Result<Resolved, StoreError> {
    let group = match selector {
        Selector::Name(name) => {
            let record = store::load_at(home, name)?;
            return Ok(Resolved {
                records: vec![record],
                skipped: vec![],
            });
        }
        Selector::Group(group) => Some(group.as_str()),
        Selector::All => None,
    };

    let mut resolved = Resolved::default();
    for path in store::list_all_at(home)? {
        match store::load_path(&path) {
            Ok(record) => {
                if group.map_or(true, |g| record.in_group(g)) {
                    resolved.records.push(record);
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable record");
                resolved.skipped.push(Skipped { path, error });
            }
        }
    }
    Ok(resolved)
}

/// First stored record watching `watch_dir` whose process is still alive.
///
/// Unreadable records are ignored here: they cannot prove occupancy.
pub fn find_collision_at(home: &Path, watch_dir: &Path) -> Result<Option<DaemonRecord>, StoreError> {
    for path in store::list_all_at(home)? {
        let Ok(record) = store::load_path(&path) else {
            continue;
        };
        if record.watch_dir == watch_dir && probe::is_alive(record.pid) {
            tracing::debug!(daemon = %record.name, pid = record.pid, "watch dir occupied");
            return Ok(Some(record));
        }
    }
    Ok(None)
}
