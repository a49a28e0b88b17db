//! `warden install`: create the `~/.warden/` layout and a starter config.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use warden_core::paths::{config_dir, daemon_dir, logs_dir, warden_root};
use warden_daemon::Settings;

use crate::output;

pub const DEFAULT_CONFIG_NAME: &str = "default.toml";
pub const DEFAULT_SCRIPT_NAME: &str = "dummy.sh";

const DEFAULT_CONFIG: &str = r#"# Workflows started with `warden invoke --config <key>`.
# The file name (here "default") becomes the daemon group.

[workflows.dummy]
watch = "~/Downloads"
script = "~/.warden/config/dummy.sh"
# log = "dummy"
"#;

const DEFAULT_SCRIPT: &str = r#"#!/bin/sh
# Run by the "dummy" workflow on every change under the watched directory.
echo "change detected at $(date)"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InstallTarget {
    /// Directories and the default config.
    Full,
    /// Only the default config.
    Config,
    /// Only the directories.
    Dirs,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[arg(value_enum)]
    pub target: InstallTarget,
}

impl InstallArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let home = &settings.home;
        if matches!(self.target, InstallTarget::Full | InstallTarget::Dirs) {
            create_dirs(home)?;
            output::ok(format_args!("initialized {}", warden_root(home).display()));
        }
        if matches!(self.target, InstallTarget::Full | InstallTarget::Config) {
            let path = create_config(home)?;
            match path {
                Some(path) => output::ok(format_args!("wrote {}", path.display())),
                None => println!("configuration already present in {}", config_dir(home).display()),
            }
        }
        Ok(())
    }
}

/// Create `config/`, `daemon/` and `logs/`. Existing directories are kept.
pub fn create_dirs(home: &Path) -> Result<()> {
    for dir in [config_dir(home), daemon_dir(home), logs_dir(home)] {
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        set_dir_permissions(&dir)?;
    }
    Ok(())
}

/// Write the default config and the script its workflow runs, keeping
/// whichever already exist. Returns the config path when it was written.
pub fn create_config(home: &Path) -> Result<Option<PathBuf>> {
    let dir = config_dir(home);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    write_new(&dir.join(DEFAULT_SCRIPT_NAME), DEFAULT_SCRIPT, 0o700)?;
    let path = dir.join(DEFAULT_CONFIG_NAME);
    Ok(write_new(&path, DEFAULT_CONFIG, 0o600)?.then_some(path))
}

/// Create `path` with `contents` unless it exists. Returns whether it wrote.
fn write_new(path: &Path, contents: &str, mode: u32) -> Result<bool> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err).with_context(|| format!("creating {}", path.display())),
    };
    file.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .with_context(|| format!("chmod {}", path.display()))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
