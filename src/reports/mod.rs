// Reports module - deviation analysis and per-fund outcomes

pub mod deviation;

use serde::Serialize;

pub use deviation::{analyze, pct_change, DeviationReport};

/// Why a fund produced no report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// No NAV endpoint configured for the fund key
    NoEndpoint,
    /// The endpoint returned no usable NAV history
    NavUnavailable,
    /// The holdings file could not be read
    HoldingsUnreadable(String),
}

impl SkipReason {
    pub fn describe(&self, fund_key: &str) -> String {
        match self {
            SkipReason::NoEndpoint => format!("No NAV endpoint configured for {}", fund_key),
            SkipReason::NavUnavailable => format!("NAV data unavailable for {}", fund_key),
            SkipReason::HoldingsUnreadable(err) => {
                format!("Holdings unreadable for {}: {}", fund_key, err)
            }
        }
    }
}

/// Result of processing one fund
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FundOutcome {
    Analyzed(DeviationReport),
    Skipped { fund_key: String, reason: SkipReason },
}

impl FundOutcome {
    pub fn fund_key(&self) -> &str {
        match self {
            FundOutcome::Analyzed(report) => &report.fund_key,
            FundOutcome::Skipped { fund_key, .. } => fund_key,
        }
    }
}
