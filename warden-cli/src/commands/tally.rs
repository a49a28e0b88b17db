//! `warden tally`: list every stored daemon with its observed state.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use warden_daemon::{Failure, ProcessState, Settings, Tally, TallyRow};

use crate::output;

/// Arguments for `warden tally`.
#[derive(Args, Debug)]
pub struct TallyArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl TallyArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let tally = warden_daemon::tally(settings).context("failed to list daemons")?;
        if self.json {
            return print_json(&tally);
        }
        print_table(tally);
        Ok(())
    }
}

#[derive(Serialize)]
struct TallyJson<'a> {
    daemons: &'a [TallyRow],
    skipped: Vec<SkippedJson<'a>>,
}

#[derive(Serialize)]
struct SkippedJson<'a> {
    target: &'a str,
    error: String,
}

#[derive(Tabled)]
struct TallyTableRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "GROUP")]
    group: String,
    #[tabled(rename = "PID")]
    pid: i32,
    #[tabled(rename = "INVOKED")]
    invoked: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn print_json(tally: &Tally) -> Result<()> {
    let payload = TallyJson {
        daemons: &tally.rows,
        skipped: tally.skipped.iter().map(skipped_json).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize tally JSON")?
    );
    Ok(())
}

fn skipped_json(failure: &Failure) -> SkippedJson<'_> {
    SkippedJson {
        target: &failure.target,
        error: failure.error.to_string(),
    }
}

fn print_table(tally: Tally) {
    output::failures(&tally.skipped);

    let count = |state: ProcessState| tally.rows.iter().filter(|r| r.state == state).count();
    println!(
        "Warden v{} | {} daemons | {} running | {} stopped | {} dead",
        env!("CARGO_PKG_VERSION"),
        tally.rows.len(),
        count(ProcessState::Running).to_string().green(),
        count(ProcessState::Stopped).to_string().yellow(),
        count(ProcessState::Dead).to_string().red(),
    );

    if tally.rows.is_empty() {
        println!("No daemons invoked.");
        return;
    }

    let rows: Vec<TallyTableRow> = tally
        .rows
        .into_iter()
        .map(|row| TallyTableRow {
            name: row.record.name.0,
            group: row.record.group,
            pid: row.record.pid,
            invoked: format_invoked(row.record.invoked_at),
            status: row.state.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn format_invoked(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
