//! Command dispatcher that routes parsed CLI commands to their handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::cli::{formatters, Cli, Commands};
use navdrift::calendar;
use navdrift::config::{Config, ModeOverride};
use navdrift::pipeline;
use navdrift::prerun::{self, PrerunStatus};
use navdrift::pricing::{CachedQuotes, YahooQuotes};

/// Route a parsed command to its handler
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let json_output = cli.json;
    match cli.command {
        Commands::Run {
            backtest_date,
            backtest_time,
            skip_prerun,
        } => {
            let config = load_config(cli.config)?;
            let overrides = ModeOverride {
                backtest_date,
                backtest_time,
            };
            dispatch_run(&config, &overrides, skip_prerun, json_output).await
        }
        Commands::Funds => {
            let config = load_config(cli.config)?;
            print!("{}", formatters::format_funds_table(&config));
            Ok(())
        }
        Commands::Calendar { date } => dispatch_calendar(&date, json_output),
    }
}

fn load_config(path: Option<std::path::PathBuf>) -> Result<Config> {
    let path = match path {
        Some(p) => p,
        None => Config::default_path()?,
    };
    info!("Loading config from {}", path.display());
    Config::load(&path)
}

async fn dispatch_run(
    config: &Config,
    overrides: &ModeOverride,
    skip_prerun: bool,
    json_output: bool,
) -> Result<()> {
    // Date errors abort before any network traffic
    let clock = config.run_clock(overrides)?;

    if let Some(prerun_cfg) = config.prerun.as_ref().filter(|_| !skip_prerun) {
        if !json_output {
            println!("{} Running pre-run command...", "🚀".bold());
        }
        let detail = match prerun::run_prerun(prerun_cfg).await {
            PrerunStatus::Succeeded => None,
            PrerunStatus::Failed(Some(code)) => Some(format!("exit code {}", code)),
            PrerunStatus::Failed(None) => Some("terminated by signal".to_string()),
            PrerunStatus::SpawnError(err) => Some(err),
        };
        if let Some(detail) = detail {
            let warning = format!(
                "{} Skipping NAV analysis: pre-run command failed ({})",
                "⚠".yellow().bold(),
                detail
            );
            if json_output {
                // No fund was analyzed
                eprintln!("{}", warning);
                println!("{}", formatters::format_outcomes_json(&[]));
            } else {
                println!("{}", warning);
            }
            return Ok(());
        }
    }

    let client = pipeline::build_http_client(config)?;
    let quotes = CachedQuotes::new(YahooQuotes::new(client.clone()));

    let outcomes = pipeline::run_analysis(config, &client, &quotes, &clock).await;

    if json_output {
        println!("{}", formatters::format_outcomes_json(&outcomes));
    } else if outcomes.is_empty() {
        println!("{} No holdings files configured", "ℹ".blue().bold());
    } else {
        print!("{}", formatters::format_outcomes_text(&outcomes));
    }
    Ok(())
}

fn dispatch_calendar(date: &str, json_output: bool) -> Result<()> {
    let date = calendar::parse_date(date).context("Invalid calendar date")?;
    let prev = calendar::previous_trading_day(date);
    let month_start = calendar::month_start(date);

    if json_output {
        let json = serde_json::json!({
            "date": date,
            "previous_trading_day": prev,
            "month_start": month_start,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("Date:                 {}", date.format(calendar::DATE_FORMAT));
        println!("Previous trading day: {}", prev.format(calendar::DATE_FORMAT));
        println!("Month start:          {}", month_start.format(calendar::DATE_FORMAT));
    }
    Ok(())
}
