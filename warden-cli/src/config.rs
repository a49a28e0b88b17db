//! Workflow definitions read from `~/.warden/config/*.toml`.
//!
//! ```toml
//! [workflows.helix]
//! watch = "~/src/helix"
//! script = "~/scripts/helix.sh"
//! log = "helix"          # optional, defaults to the key
//! ```
//!
//! The file stem becomes the daemon's group.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use warden_core::paths::config_dir;

pub const CONFIG_EXTENSION: &str = "toml";

#[derive(Debug, Default, Deserialize)]
struct WorkflowFile {
    #[serde(default)]
    workflows: BTreeMap<String, Workflow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub watch: Option<String>,
    pub script: Option<String>,
    pub log: Option<String>,
}

/// A workflow together with the group of the file that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundWorkflow {
    /// Stem of the defining file.
    pub group: String,
    pub workflow: Workflow,
}

/// Find `key` in the first config file (sorted by name) that defines it.
///
/// Files that fail to parse are skipped with a warning.
pub fn find_workflow_at(home: &Path, key: &str) -> Result<FoundWorkflow> {
    let dir = config_dir(home);
    for path in config_files(&dir)? {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: WorkflowFile = match toml::from_str(&contents) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable config");
                continue;
            }
        };
        if let Some(workflow) = file.workflows.get(key) {
            let group = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::debug!(key, source = %path.display(), "workflow resolved");
            return Ok(FoundWorkflow {
                group,
                workflow: workflow.clone(),
            });
        }
    }
    bail!(
        "workflow '{key}' not found in {}/*.{CONFIG_EXTENSION}",
        dir.display()
    )
}

fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| {
        format!(
            "failed to read config directory {} (run `warden install config` first)",
            dir.display()
        )
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().and_then(|x| x.to_str()) == Some(CONFIG_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}
