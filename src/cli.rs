//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

/// A terminal dashboard for cryptocurrency prices.
///
/// Coinwatch shows the Coinranking top listing, refreshes it on a timer and
/// lets you search by name or symbol with a debounced query. Theme, search
/// history and the last results persist across runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "coinwatch")]
#[command(version)]
#[command(about = "A terminal dashboard for crypto prices", long_about = None)]
pub struct Args {
    /// RapidAPI key for the Coinranking API
    #[arg(short = 'k', long, env = "COINWATCH_API_KEY")]
    pub api_key: Option<String>,

    /// How many coins the top listing should contain
    #[arg(short = 'l', long)]
    pub limit: Option<u32>,

    /// Refresh delay in seconds
    #[arg(short = 'd', long)]
    pub delay: Option<f64>,

    /// Quiet window after the last keystroke before a search fires, in ms
    #[arg(long)]
    pub debounce: Option<u64>,

    /// API timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "COINWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of refresh iterations before exiting
    ///
    /// 0 means infinite
    #[arg(short = 'n', long, default_value = "0")]
    pub iterations: u64,

    /// Batch mode - print the table to stdout instead of running the TUI
    #[arg(short = 'b', long)]
    pub batch: bool,

    /// Run a search instead of the top listing (handy with --batch)
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Start in dark mode, overriding config and saved session
    #[arg(long, conflicts_with = "light")]
    pub dark: bool,

    /// Start in light mode, overriding config and saved session
    #[arg(long)]
    pub light: bool,

    /// Skip restoring cached coins and search state from the last session
    #[arg(long)]
    pub no_restore: bool,
}

impl Args {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
