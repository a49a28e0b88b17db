//! `warden summon`: show a daemon's log.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;

use warden_core::DaemonName;
use warden_daemon::Settings;

#[derive(Args, Debug)]
pub struct SummonArgs {
    /// Daemon whose log to show.
    pub name: String,

    /// Number of trailing lines to show.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub lines: usize,

    /// Keep printing new lines as they are written (`tail -f`).
    #[arg(short, long)]
    pub follow: bool,
}

impl SummonArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let name = DaemonName::parse(self.name.as_str())?;
        let path = warden_daemon::log_file(settings, &name)
            .with_context(|| format!("no log for daemon '{name}'"))?;

        if self.follow {
            return follow(&path, self.lines);
        }
        print_tail(&path, self.lines).with_context(|| format!("failed to read log for '{name}'"))
    }
}

fn follow(path: &Path, lines: usize) -> Result<()> {
    let status = Command::new("tail")
        .arg("-n")
        .arg(lines.to_string())
        .arg("-f")
        .arg(path)
        .status()
        .context("failed to run `tail`")?;
    if !status.success() {
        bail!("`tail -f {}` exited with {status}", path.display());
    }
    Ok(())
}

fn print_tail(path: &Path, lines: usize) -> Result<()> {
    if !path.exists() {
        println!("log file not found: {}", path.display());
        return Ok(());
    }

    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    for line in tail(BufReader::new(file), lines)? {
        println!("{line}");
    }
    Ok(())
}

/// Last `lines` lines of `reader`, oldest first. Scripts may print
/// anything, so invalid UTF-8 is replaced rather than rejected.
fn tail(mut reader: impl BufRead, lines: usize) -> Result<VecDeque<String>> {
    let mut tail = VecDeque::<String>::with_capacity(lines);
    if lines == 0 {
        return Ok(tail);
    }
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).context("read log line")? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if tail.len() == lines {
            tail.pop_front();
        }
        tail.push_back(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(tail)
}
