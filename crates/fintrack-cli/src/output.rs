//! Terminal output for command results.
//!
//! Response envelopes go to stdout so they can be piped; status lines about
//! the session go to stderr.

use std::fmt::Display;

use anyhow::Result;
use colored::Colorize;
use fintrack::ApiResponse;

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a `label: value` line.
pub fn field(label: &str, value: impl Display) {
    println!("{}: {}", label.dimmed(), value);
}

/// Write the envelope as JSON, one line when `compact`.
pub fn envelope(response: &ApiResponse, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    println!("{rendered}");

    if !compact && let Some(message) = &response.message {
        let status = if response.success {
            message.green()
        } else {
            message.yellow()
        };
        eprintln!("{status}");
    }
    Ok(())
}
