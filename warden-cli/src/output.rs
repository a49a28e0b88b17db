//! Console conventions: `OK:` on stdout, `warning:` and `error:` on stderr.

use std::fmt::Display;

use colored::Colorize;

use warden_daemon::Failure;

pub fn ok(message: impl Display) {
    println!("{} {message}", "OK:".green());
}

pub fn warning(message: impl Display) {
    eprintln!("{} {message}", "warning:".yellow());
}

pub fn error(message: impl Display) {
    eprintln!("{} {message}", "error:".red().bold());
}

/// One warning line per failed batch item.
pub fn failures(failed: &[Failure]) {
    for failure in failed {
        warning(format_args!("{}: {}", failure.target, failure.error));
    }
}

/// Double-quoted, escaped rendering of a name.
pub fn quoted(value: &str) -> String {
    format!("{value:?}")
}
