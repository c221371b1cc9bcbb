//! Single linear run over every configured fund
//!
//! Funds are processed one at a time. A fund without an endpoint, NAV
//! history, or readable holdings is skipped; the rest of the run continues.

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::calendar::RunClock;
use crate::config::Config;
use crate::importers::{self, fund_key_from_path};
use crate::nav::NavSeries;
use crate::pricing::{mfapi, QuoteSource};
use crate::reports::{analyze, FundOutcome, SkipReason};
use crate::valuation::compute_portfolio_valuation;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; NavdriftBot/0.1)";

/// Shared HTTP client for the run
pub fn build_http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Value one fund's holdings and compare against its NAV series.
pub async fn analyze_fund<S: QuoteSource + ?Sized>(
    fund_key: &str,
    nav_series: &NavSeries,
    holdings_path: &Path,
    quotes: &S,
    clock: &RunClock,
    market_suffix: &str,
) -> FundOutcome {
    let fund = match importers::import_holdings(holdings_path) {
        Ok(fund) => fund,
        Err(err) => {
            warn!("Skipping {}: {:#}", fund_key, err);
            return FundOutcome::Skipped {
                fund_key: fund_key.to_string(),
                reason: SkipReason::HoldingsUnreadable(format!("{:#}", err)),
            };
        }
    };

    let valuation = compute_portfolio_valuation(quotes, &fund.holdings, clock, market_suffix).await;
    FundOutcome::Analyzed(analyze(fund_key, nav_series, &valuation, clock))
}

/// Run the analysis for every holdings file in the config.
pub async fn run_analysis<S: QuoteSource + ?Sized>(
    config: &Config,
    client: &Client,
    quotes: &S,
    clock: &RunClock,
) -> Vec<FundOutcome> {
    let paths = config.holdings_paths();
    info!(
        "Analyzing {} funds for NAV date {} (backtest: {})",
        paths.len(),
        clock.nav_date,
        clock.backtest
    );

    let mut outcomes = Vec::with_capacity(paths.len());
    for path in &paths {
        let fund_key = match fund_key_from_path(path) {
            Ok(key) => key,
            Err(err) => {
                outcomes.push(FundOutcome::Skipped {
                    fund_key: path.display().to_string(),
                    reason: SkipReason::HoldingsUnreadable(err.to_string()),
                });
                continue;
            }
        };

        let Some(endpoint) = config.endpoint_for(&fund_key) else {
            warn!("No NAV endpoint configured for {}", fund_key);
            outcomes.push(FundOutcome::Skipped {
                fund_key,
                reason: SkipReason::NoEndpoint,
            });
            continue;
        };

        let nav_series = mfapi::fetch_nav_series(client, endpoint).await;
        if nav_series.is_empty() {
            warn!("NAV data unavailable for {}", fund_key);
            outcomes.push(FundOutcome::Skipped {
                fund_key,
                reason: SkipReason::NavUnavailable,
            });
            continue;
        }
        debug!(
            "NAV history for {}: {} points from {:?} to {:?}",
            fund_key,
            nav_series.len(),
            nav_series.first_date(),
            nav_series.last_date()
        );

        outcomes.push(
            analyze_fund(
                &fund_key,
                &nav_series,
                path,
                quotes,
                clock,
                &config.market_suffix,
            )
            .await,
        );
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::testing::StaticQuotes;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn clock() -> RunClock {
        RunClock::backtest(d(2025, 7, 22), NaiveTime::from_hms_opt(15, 50, 0).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_fund_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha-fund_final.csv");
        std::fs::write(&path, "ticker,corpus_percent\nAAA,60\nBBB,40\n,5\n").unwrap();

        let quotes = StaticQuotes::default()
            .with("AAA.NS", Some(dec!(100)), Some(dec!(97)))
            .with("BBB.NS", Some(dec!(200)), Some(dec!(197)));
        let series: NavSeries = vec![(d(2025, 7, 21), dec!(50)), (d(2025, 7, 22), dec!(49))]
            .into_iter()
            .collect();

        let outcome = analyze_fund("alpha-fund", &series, &path, &quotes, &clock(), ".NS").await;

        match outcome {
            FundOutcome::Analyzed(report) => {
                assert_eq!(report.valuation.previous_value, dec!(140));
                assert_eq!(report.valuation.live_value, dec!(137));
                assert_eq!(report.official_drop_pct, Some(dec!(-2)));
                // (137 - 140) / 140 * 100
                let calc = report.calc_drop_pct.unwrap();
                assert_eq!(calc.round_dp(4), dec!(-2.1429));
                assert_eq!(report.deviation_pct.map(|v| v.round_dp(4)), Some(dec!(-0.1429)));
                assert_eq!(report.month_trend_pct, None);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_holdings_are_skipped() {
        let quotes = StaticQuotes::default();
        let outcome = analyze_fund(
            "ghost",
            &NavSeries::new(),
            &PathBuf::from("/nonexistent/ghost_final.csv"),
            &quotes,
            &clock(),
            ".NS",
        )
        .await;

        assert!(matches!(
            outcome,
            FundOutcome::Skipped {
                reason: SkipReason::HoldingsUnreadable(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_skips_unmapped_and_unreachable_funds() {
        let config = Config::parse(
            r#"
request_timeout_secs = 2
holdings = ["mapped-fund_final.csv", "orphan-fund_final.csv"]

[sources]
"mapped-fund" = "http://127.0.0.1:1/mf/1"
"#,
            PathBuf::from("/tmp"),
        )
        .unwrap();
        let client = build_http_client(&config).unwrap();
        let quotes = StaticQuotes::default();

        let outcomes = run_analysis(&config, &client, &quotes, &clock()).await;

        assert_eq!(
            outcomes,
            vec![
                FundOutcome::Skipped {
                    fund_key: "mapped-fund".to_string(),
                    reason: SkipReason::NavUnavailable,
                },
                FundOutcome::Skipped {
                    fund_key: "orphan-fund".to_string(),
                    reason: SkipReason::NoEndpoint,
                },
            ]
        );
        // Prices are never requested for skipped funds
        assert_eq!(quotes.call_count(), 0);
    }
}
