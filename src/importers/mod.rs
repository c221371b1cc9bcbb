// Import module - fund holdings CSV parsers

pub mod holdings_csv;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

use crate::valuation::Holding;

pub use holdings_csv::{lookup_two_keys, WEIGHT_COLUMN, WEIGHT_COLUMN_FALLBACK};

/// Holdings of one fund as read from disk
#[derive(Debug, Clone)]
pub struct FundHoldings {
    pub fund_key: String,
    pub holdings: Vec<Holding>,
}

/// Fund key for a holdings file: the file name up to the first `_`.
///
/// `quant-small-cap-fund-direct-plan-growth_final.csv` ->
/// `quant-small-cap-fund-direct-plan-growth`
pub fn fund_key_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid holdings file name: {:?}", path))?;

    let key = name.split('_').next().unwrap_or(name);
    let key = key.strip_suffix(".csv").unwrap_or(key);
    if key.is_empty() {
        return Err(anyhow!("Cannot derive fund key from {:?}", path));
    }
    Ok(key.to_string())
}

/// Import a holdings file (CSV only)
pub fn import_holdings<P: AsRef<Path>>(file_path: P) -> Result<FundHoldings> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    info!("Importing holdings file: {:?} (type: {})", path, extension);

    let holdings = match extension.as_str() {
        "csv" | "txt" => holdings_csv::parse_holdings_csv(path)?,
        _ => {
            return Err(anyhow!(
                "Unsupported file format: {}. Supported formats: .csv",
                extension
            ))
        }
    };

    Ok(FundHoldings {
        fund_key: fund_key_from_path(path)?,
        holdings,
    })
}
