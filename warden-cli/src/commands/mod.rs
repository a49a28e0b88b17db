pub mod freeze;
pub mod install;
pub mod invoke;
pub mod rekindle;
pub mod slay;
pub mod summon;
pub mod tally;

use anyhow::Result;
use clap::Args;

use warden_core::DaemonName;
use warden_daemon::Selector;

/// Exactly one of NAME, `--group` or `--all`.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SelectorArgs {
    /// Daemon name.
    pub name: Option<String>,

    /// Every daemon in this group.
    #[arg(long)]
    pub group: Option<String>,

    /// Every stored daemon.
    #[arg(long)]
    pub all: bool,
}

impl SelectorArgs {
    pub fn selector(&self) -> Result<Selector> {
        if let Some(name) = &self.name {
            return Ok(Selector::Name(DaemonName::parse(name.as_str())?));
        }
        if let Some(group) = &self.group {
            return Ok(Selector::Group(group.clone()));
        }
        Ok(Selector::All)
    }
}
