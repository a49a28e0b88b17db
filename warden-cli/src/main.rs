//! Warden: supervisor for detached directory-watcher daemons.
//!
//! # Usage
//!
//! ```text
//! warden invoke [--config KEY] [--name N] [--group G] [--watch DIR] [--script PATH] [--log NAME]
//! warden freeze   <NAME | --group G | --all>
//! warden rekindle <NAME | --group G | --all>
//! warden slay     <NAME | --group G | --all>
//! warden tally [--json]
//! warden summon <NAME> [--lines N] [--follow]
//! warden install full|config|dirs
//! ```

mod commands;
mod config;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    freeze::FreezeArgs, install::InstallArgs, invoke::InvokeArgs, rekindle::RekindleArgs,
    slay::SlayArgs, summon::SummonArgs, tally::TallyArgs,
};
use warden_daemon::settings::{DEFAULT_INTERPRETER, DEFAULT_WATCH_PROGRAM};
use warden_daemon::{DaemonError, Settings, WatcherCommand, EXIT_FAILURE};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Start, pause, restart and stop detached directory watchers",
    long_about = None,
)]
struct Cli {
    /// Print debug diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Watch-and-run executable used to start daemons.
    #[arg(long, global = true, env = "WARDEN_WATCHER", default_value = DEFAULT_WATCH_PROGRAM)]
    watcher: String,

    /// Interpreter the watcher runs scripts with.
    #[arg(long, global = true, env = "WARDEN_INTERPRETER", default_value = DEFAULT_INTERPRETER)]
    interpreter: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new watcher daemon.
    Invoke(InvokeArgs),

    /// Pause daemons (SIGSTOP). Resume with OS tools.
    Freeze(FreezeArgs),

    /// Start a fresh watcher from stored metadata.
    Rekindle(RekindleArgs),

    /// Stop daemons and delete their metadata and logs.
    Slay(SlayArgs),

    /// List daemons with their group, PID, start time and status.
    Tally(TallyArgs),

    /// Show a daemon's log.
    Summon(SummonArgs),

    /// Create ~/.warden directories and a default workflow config.
    Install(InstallArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit(&err),
    };
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format_args!("{err:#}"));
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    let settings =
        Settings::new(home).with_watcher(WatcherCommand::new(cli.watcher, cli.interpreter));

    match cli.command {
        Commands::Invoke(args) => args.run(&settings),
        Commands::Freeze(args) => args.run(&settings),
        Commands::Rekindle(args) => args.run(&settings),
        Commands::Slay(args) => args.run(&settings),
        Commands::Tally(args) => args.run(&settings),
        Commands::Summon(args) => args.run(&settings),
        Commands::Install(args) => args.run(&settings),
    }
}

/// Help and version exit 0; usage errors exit 1 so that 2 stays reserved
/// for invoke conflicts.
fn usage_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::from(EXIT_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<DaemonError>()
        .map_or(EXIT_FAILURE, DaemonError::exit_code)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
