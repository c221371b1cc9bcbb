//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of the analysis from presentation.

use colored::Colorize;
use navdrift::calendar::{DATE_FORMAT, TIME_FORMAT};
use navdrift::config::Config;
use navdrift::importers::fund_key_from_path;
use navdrift::reports::{DeviationReport, FundOutcome};
use navdrift::utils::{format_inr, format_pct};
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

const SEPARATOR: &str = "::::::::::::::::::::::::::::::::::::::::";

fn colored_pct(value: Decimal) -> String {
    let text = format_pct(value);
    if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Format the outcomes of a run for JSON output
pub fn format_outcomes_json(outcomes: &[FundOutcome]) -> String {
    serde_json::to_string_pretty(outcomes)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the outcomes of a run as text blocks, one per fund
pub fn format_outcomes_text(outcomes: &[FundOutcome]) -> String {
    let mut output = String::new();
    for outcome in outcomes {
        match outcome {
            FundOutcome::Analyzed(report) => output.push_str(&format_report(report)),
            FundOutcome::Skipped { fund_key, reason } => {
                output.push_str(&format!(
                    "\n{} {}\n",
                    "⚠".yellow().bold(),
                    reason.describe(fund_key)
                ));
            }
        }
    }
    output
}

/// Format one fund's deviation report
pub fn format_report(report: &DeviationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n\n{} Fund: {}\n",
        "📁".cyan().bold(),
        report.fund_key.bold()
    ));
    output.push_str(&format!(
        "📊 NAV Date: {}, Time: {}\n",
        report.nav_date.format(DATE_FORMAT),
        report.run_time.format(TIME_FORMAT)
    ));

    if let (Some(prev), Some(today), Some(pct)) =
        (report.nav_yesterday, report.nav_today, report.official_drop_pct)
    {
        output.push_str(&format!("\n💹 Off NAV (Prev): {}\n", format_inr(prev)));
        output.push_str(&format!("💹 Off NAV (Now): {}\n", format_inr(today)));
        output.push_str(&format!("📉 Off Drop %: {}\n", colored_pct(pct)));
    }

    output.push_str(&format!(
        "\n💹 Calc NAV (Prev): {}\n",
        format_inr(report.valuation.previous_value)
    ));
    output.push_str(&format!(
        "💹 Calc NAV (Now): {}\n",
        format_inr(report.valuation.live_value)
    ));
    match report.calc_drop_pct {
        Some(pct) => output.push_str(&format!("📉 Calc Drop %: {}\n", colored_pct(pct))),
        None => output.push_str(&format!(
            "{} Could not compute proxy drop\n",
            "⚠".yellow().bold()
        )),
    }

    if let Some(deviation) = report.deviation_pct {
        output.push_str(&format!(
            "\n🔴 Deviation: {}\n",
            format_pct(deviation).bold()
        ));
    }

    match report.month_trend() {
        Some((start, yesterday, pct)) => {
            output.push_str("\n🔹 Trend Analysis (Month-to-Date):\n");
            output.push_str(&format!(
                "   NAV on {}: {}\n",
                report.month_start_date.format(DATE_FORMAT),
                format_inr(start)
            ));
            output.push_str(&format!(
                "   NAV on {}: {}\n",
                report.prev_date.format(DATE_FORMAT),
                format_inr(yesterday)
            ));
            output.push_str(&format!("   Cumulative Change: {}\n", colored_pct(pct)));
        }
        None => output.push_str(&format!(
            "{} Month trend data insufficient\n",
            "⚠".yellow().bold()
        )),
    }

    output.push_str(&format!("{} Done.\n", "✓".green().bold()));
    output.push_str(&format!("{}\n", SEPARATOR.bright_black()));
    output
}

/// Format the configured funds as a table
pub fn format_funds_table(config: &Config) -> String {
    #[derive(Tabled)]
    struct FundRow {
        #[tabled(rename = "Fund")]
        fund: String,
        #[tabled(rename = "Holdings file")]
        holdings: String,
        #[tabled(rename = "NAV endpoint")]
        endpoint: String,
    }

    let paths = config.holdings_paths();
    if paths.is_empty() {
        return format!(
            "{} No holdings files configured\nAdd them to the `holdings` list in the config file\n",
            "ℹ".blue().bold()
        );
    }

    let rows: Vec<FundRow> = paths
        .iter()
        .map(|path| {
            let fund = fund_key_from_path(path).unwrap_or_else(|_| "?".to_string());
            let endpoint = config
                .endpoint_for(&fund)
                .map(str::to_string)
                .unwrap_or_else(|| "missing".red().to_string());
            FundRow {
                fund,
                holdings: path.display().to_string(),
                endpoint,
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n", table)
}
