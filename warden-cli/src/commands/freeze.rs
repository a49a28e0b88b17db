//! `warden freeze`: pause daemons with SIGSTOP.
//!
//! There is no matching resume command: send SIGCONT with OS tools, or
//! `warden rekindle` to start over.

use anyhow::{Context, Result};
use clap::Args;

use warden_daemon::{Settings, SignalOutcome};

use super::SelectorArgs;
use crate::output::{self, quoted};

#[derive(Args, Debug)]
pub struct FreezeArgs {
    #[command(flatten)]
    pub target: SelectorArgs,
}

impl FreezeArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let selector = self.target.selector()?;
        let report = warden_daemon::freeze(settings, &selector)
            .with_context(|| format!("failed to freeze {selector}"))?;

        for frozen in &report.done {
            match frozen.outcome {
                SignalOutcome::Delivered => {
                    output::ok(format_args!("froze daemon {}", quoted(frozen.name.as_str())))
                }
                SignalOutcome::AlreadyGone => output::warning(format_args!(
                    "daemon {} is not running (PID {})",
                    quoted(frozen.name.as_str()),
                    frozen.pid
                )),
            }
        }
        output::failures(&report.failed);
        Ok(())
    }
}
