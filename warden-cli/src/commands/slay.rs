//! `warden slay`: terminate daemons and forget them.

use anyhow::{Context, Result};
use clap::Args;

use warden_daemon::Settings;

use super::SelectorArgs;
use crate::output::{self, quoted};

#[derive(Args, Debug)]
pub struct SlayArgs {
    #[command(flatten)]
    pub target: SelectorArgs,
}

impl SlayArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let selector = self.target.selector()?;
        let report = warden_daemon::slay(settings, &selector)
            .with_context(|| format!("failed to slay {selector}"))?;

        for slain in &report.done {
            output::ok(format_args!("slayed daemon {}", quoted(slain.name.as_str())));
        }
        output::failures(&report.failed);
        Ok(())
    }
}
