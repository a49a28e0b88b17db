//! `warden invoke`: start a new watcher daemon.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use warden_daemon::{InvokeRequest, Settings};

use crate::config::find_workflow_at;
use crate::output::{self, quoted};

/// Arguments for `warden invoke`. Explicit flags override workflow values.
#[derive(Args, Debug, Default)]
pub struct InvokeArgs {
    /// Workflow key from ~/.warden/config/*.toml.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Unique daemon name (defaults to the workflow key).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Group label (defaults to the workflow file name).
    #[arg(short, long)]
    pub group: Option<String>,

    /// Directory to watch.
    #[arg(short, long)]
    pub watch: Option<String>,

    /// Script to run on every change.
    #[arg(short, long)]
    pub script: Option<String>,

    /// Log file name, without the `.log` extension (defaults to the name).
    #[arg(short, long)]
    pub log: Option<String>,
}

impl InvokeArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let req = self.request(&settings.home)?;
        let record = warden_daemon::invoke(settings, &req)
            .with_context(|| format!("failed to invoke daemon '{}'", req.name))?;

        output::ok(format_args!(
            "invoked daemon {} (group={}) with PID {}",
            quoted(record.name.as_str()),
            quoted(&record.group),
            record.pid
        ));
        Ok(())
    }

    /// Merge flags over the selected workflow, if any.
    fn request(self, home: &Path) -> Result<InvokeRequest> {
        let Some(key) = self.config else {
            let name = self.name.unwrap_or_default();
            return Ok(InvokeRequest {
                log_name: self.log.unwrap_or_else(|| name.clone()),
                name,
                group: self.group.unwrap_or_default(),
                watch_dir: self.watch.unwrap_or_default(),
                script_path: self.script.unwrap_or_default(),
            });
        };

        let found = find_workflow_at(home, &key)?;
        let workflow = found.workflow;
        Ok(InvokeRequest {
            name: self.name.unwrap_or_else(|| key.clone()),
            group: self.group.unwrap_or(found.group),
            watch_dir: self.watch.or(workflow.watch).unwrap_or_default(),
            script_path: self.script.or(workflow.script).unwrap_or_default(),
            log_name: self.log.or(workflow.log).unwrap_or(key),
        })
    }
}
