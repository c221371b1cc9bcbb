use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "navdrift")]
#[command(
    version,
    about = "Estimate intraday mutual fund NAV deviation from disclosed holdings"
)]
#[command(
    long_about = "Values each fund's disclosed holdings at previous close and live prices, compares the move against the official NAV history and reports the deviation and month-to-date trend."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Verbose logging (debug level) on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $NAVDRIFT_CONFIG or <config dir>/navdrift/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the NAV deviation analysis for every configured fund
    Run {
        /// Pin the NAV date (YYYY-MM-DD) and price "live" from that day's close
        #[arg(long)]
        backtest_date: Option<String>,

        /// Pinned run time for backtests (HH:MM:SS); also adjusts a backtest pinned in the config
        #[arg(long)]
        backtest_time: Option<String>,

        /// Do not run the configured pre-run command
        #[arg(long)]
        skip_prerun: bool,
    },

    /// List configured funds, holdings files and NAV endpoints
    Funds,

    /// Show the previous trading day and month start for a date
    Calendar {
        /// Date (YYYY-MM-DD)
        date: String,
    },
}
