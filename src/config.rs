//! Run configuration
//!
//! Loaded from a TOML file, by default `<config home>/navdrift/config.toml`:
//!
//! ```toml
//! market_suffix = ".NS"
//! request_timeout_secs = 10
//! holdings = ["quant-small-cap-fund-direct-plan-growth_final.csv"]
//!
//! [mode]
//! backtest = false
//! date = "2025-07-22"
//! time = "15:50:00"
//!
//! [sources]
//! "quant-small-cap-fund-direct-plan-growth" = "https://api.mfapi.in/mf/120828"
//!
//! [prerun]
//! program = "jmeter"
//! args = ["-n", "-t", "Holdings.jmx", "-l", "results/Holdings.csv"]
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::calendar::{self, RunClock};
use crate::error::NavError;

pub const DEFAULT_MARKET_SUFFIX: &str = ".NS";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const CONFIG_ENV: &str = "NAVDRIFT_CONFIG";

fn default_market_suffix() -> String {
    DEFAULT_MARKET_SUFFIX.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_market_suffix")]
    pub market_suffix: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Holdings CSV files, relative to the config file's directory
    #[serde(default)]
    pub holdings: Vec<PathBuf>,

    #[serde(default)]
    pub mode: ModeConfig,

    /// Fund key -> NAV history endpoint
    #[serde(default)]
    pub sources: BTreeMap<String, String>,

    pub prerun: Option<PrerunConfig>,

    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    #[serde(default)]
    pub backtest: bool,
    /// Pinned NAV date for backtests (YYYY-MM-DD)
    pub date: Option<String>,
    /// Pinned run time for backtests (HH:MM:SS)
    pub time: Option<String>,
}

/// External command executed before the analysis
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrerunConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Command-line override of the mode switch
#[derive(Debug, Clone, Default)]
pub struct ModeOverride {
    pub backtest_date: Option<String>,
    pub backtest_time: Option<String>,
}

impl Config {
    /// Default config location, honoring `NAVDRIFT_CONFIG` and `XDG_CONFIG_HOME`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(dir_spec::config_home)
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("navdrift").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&text, base_dir)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self> {
        let mut config: Config =
            toml::from_str(text).map_err(|e| NavError::Config(e.to_string()))?;
        config.base_dir = base_dir;
        debug!(
            "Loaded config: {} holdings files, {} sources",
            config.holdings.len(),
            config.sources.len()
        );
        Ok(config)
    }

    pub fn endpoint_for(&self, fund_key: &str) -> Option<&str> {
        self.sources.get(fund_key).map(String::as_str)
    }

    /// Holdings paths resolved against the config directory
    pub fn holdings_paths(&self) -> Vec<PathBuf> {
        self.holdings
            .iter()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    self.base_dir.join(p)
                }
            })
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the run clock. A malformed pinned date/time is an error.
    pub fn run_clock(&self, overrides: &ModeOverride) -> Result<RunClock> {
        let (date, time) = match &overrides.backtest_date {
            Some(date) => (Some(date.as_str()), overrides.backtest_time.as_deref()),
            None if self.mode.backtest => (
                Some(
                    self.mode
                        .date
                        .as_deref()
                        .ok_or_else(|| NavError::Config("backtest mode requires mode.date".into()))?,
                ),
                overrides.backtest_time.as_deref().or(self.mode.time.as_deref()),
            ),
            None if overrides.backtest_time.is_some() => {
                return Err(NavError::Config(
                    "a backtest time needs a backtest date (--backtest-date or mode.date)".into(),
                )
                .into());
            }
            None => (None, None),
        };

        match date {
            Some(date) => {
                let nav_date = calendar::parse_date(date)?;
                let run_time = match time {
                    Some(t) => calendar::parse_time(t)?,
                    None => NaiveTime::from_hms_opt(15, 50, 0).unwrap_or(NaiveTime::MIN),
                };
                Ok(RunClock::backtest(nav_date, run_time))
            }
            None => Ok(RunClock::live()),
        }
    }
}
