use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::valuation::Holding;

/// Primary and fallback names of the percentage weight column
pub const WEIGHT_COLUMN: &str = "corpus_percent";
pub const WEIGHT_COLUMN_FALLBACK: &str = "corpus_per";
const TICKER_COLUMN: &str = "ticker";

/// Parse a holdings CSV and extract priced holdings
pub fn parse_holdings_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Holding>> {
    let path = file_path.as_ref();
    info!("Parsing holdings CSV file: {:?}", path);

    let reader = ReaderBuilder::new()
        .flexible(true) // Scraped exports pad some rows
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open holdings CSV {}", path.display()))?;

    read_holdings(reader)
}

pub(crate) fn read_holdings<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Holding>> {
    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    debug!("CSV headers: {:?}", headers);

    let columns = find_columns(&headers)?;
    debug!("Column mapping: {:?}", columns);

    let mut holdings = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        if let Some(holding) = parse_row(&record, &columns, idx + 2) {
            holdings.push(holding);
        }
    }

    info!("Parsed {} holdings from CSV", holdings.len());
    Ok(holdings)
}

#[derive(Debug)]
struct HoldingColumns {
    ticker: usize,
    weight: Option<usize>,
    weight_fallback: Option<usize>,
}

fn find_columns(headers: &StringRecord) -> Result<HoldingColumns> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let columns = HoldingColumns {
        ticker: position(TICKER_COLUMN).ok_or_else(|| anyhow!("Ticker column not found"))?,
        weight: position(WEIGHT_COLUMN),
        weight_fallback: position(WEIGHT_COLUMN_FALLBACK),
    };

    if columns.weight.is_none() && columns.weight_fallback.is_none() {
        warn!(
            "Neither {} nor {} column present; all weights default to 0",
            WEIGHT_COLUMN, WEIGHT_COLUMN_FALLBACK
        );
    }
    Ok(columns)
}

/// Value of `primary`, else `fallback`; blank cells count as missing.
pub fn lookup_two_keys<'r>(
    record: &'r StringRecord,
    primary: Option<usize>,
    fallback: Option<usize>,
) -> Option<&'r str> {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    cell(primary).or_else(|| cell(fallback))
}

fn parse_row(record: &StringRecord, columns: &HoldingColumns, row_num: usize) -> Option<Holding> {
    let ticker = record.get(columns.ticker).map(str::trim).unwrap_or("");
    if ticker.is_empty() {
        // Cash, T-bills and other unlisted lines
        return None;
    }

    let percent = match lookup_two_keys(record, columns.weight, columns.weight_fallback) {
        Some(raw) => match parse_percent(raw) {
            Some(p) if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&p) => p,
            Some(_) => {
                warn!("Row {}: weight '{}' for {} outside 0-100%, using 0", row_num, raw, ticker);
                Decimal::ZERO
            }
            None => {
                warn!("Row {}: unparsable weight '{}' for {}, using 0", row_num, raw, ticker);
                Decimal::ZERO
            }
        },
        None => Decimal::ZERO,
    };

    Some(Holding::from_percent(ticker.to_uppercase(), percent))
}

fn parse_percent(text: &str) -> Option<Decimal> {
    let cleaned = text.trim_end_matches('%').trim().replace(',', "");
    Decimal::from_str(&cleaned).ok()
}
