//! `warden rekindle`: start a fresh watcher from a stored record.

use anyhow::{Context, Result};
use clap::Args;

use warden_daemon::Settings;

use super::SelectorArgs;
use crate::output::{self, quoted};

#[derive(Args, Debug)]
pub struct RekindleArgs {
    #[command(flatten)]
    pub target: SelectorArgs,
}

impl RekindleArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let selector = self.target.selector()?;
        let report = warden_daemon::rekindle(settings, &selector)
            .with_context(|| format!("failed to rekindle {selector}"))?;

        for item in &report.done {
            let name = quoted(item.record.name.as_str());
            if item.orphaned {
                output::warning(format_args!(
                    "previous watcher of {name} (PID {}) is still running and no longer tracked",
                    item.previous_pid
                ));
            }
            output::ok(format_args!("rekindled {name} with PID {}", item.record.pid));
        }
        output::failures(&report.failed);
        Ok(())
    }
}
