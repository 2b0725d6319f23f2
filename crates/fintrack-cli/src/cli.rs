//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line client for the fintrack personal-finance API.
#[derive(Parser, Debug)]
#[command(name = "fintrack")]
#[command(author, version = env!("FINTRACK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(
        long,
        global = true,
        env = "FINTRACK_API_URL",
        default_value = "https://api.fintrack.app"
    )]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        global = true,
        env = "FINTRACK_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Session file (defaults to the platform data directory)
    #[arg(long, global = true, env = "FINTRACK_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
