//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::client::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::controller::DEFAULT_REFRESH_SECS;
use crate::output::Format;

/// Seat availability dashboard for your terminal and browser.
#[derive(Parser, Debug)]
#[command(name = "seatwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Backend serving /api/seats
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Keep the dashboard on screen, refreshing periodically (Enter retries)
    Watch(WatchArgs),

    /// Load once, print the dashboard and exit
    Once(OnceArgs),

    /// Show the backend cache status
    Status(StatusArgs),

    /// Start the web dashboard server
    Ui(UiArgs),
}

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (minimum 30)
    #[arg(long, default_value_t = DEFAULT_REFRESH_SECS)]
    pub interval: u64,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `once` command.
#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `ui` command.
#[derive(Args, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Refresh interval in seconds (minimum 30)
    #[arg(long, default_value_t = DEFAULT_REFRESH_SECS)]
    pub interval: u64,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
