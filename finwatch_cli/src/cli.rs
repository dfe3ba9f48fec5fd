//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "finwatch", version, about = "Restock monitor with departure alerts")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/finwatch.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of compact text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the upstreams and send alerts until interrupted
    Run {
        /// Log messages instead of delivering them; no credentials needed
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
        /// Use the built-in simulated upstream instead of HTTP sources
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
        /// Announce, run a single tick and exit
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
        /// Write times as `HH:MM:SS UTC` instead of chat timestamp markup
        #[arg(long, action = ArgAction::SetTrue)]
        plain_times: bool,
    },
    /// Validate credentials and fetch one snapshot from each configured source
    Check,
    /// Print the departure schedule for a given restock instant
    Plan {
        /// Restock instant, RFC 3339 (e.g. 2026-03-01T18:00:00Z)
        #[arg(long, value_name = "RFC3339")]
        restock: String,
    },
    /// Offline health check: config plus one simulated depletion/restock cycle
    SelfCheck,
}
