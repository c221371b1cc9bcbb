//! Official NAV history client
//!
//! Endpoints follow the mfapi.in shape: a JSON document whose `data` array
//! holds `{ "date": "dd-mm-yyyy", "nav": "123.4567" }` records, usually
//! newest first.

use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::FetchFailure;
use crate::nav::NavSeries;

#[derive(Debug, Deserialize)]
struct NavResponse {
    #[serde(default)]
    data: Vec<NavRecord>,
}

#[derive(Debug, Deserialize)]
struct NavRecord {
    date: String,
    nav: NavValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NavValue {
    Text(String),
    Number(serde_json::Number),
}

impl NavValue {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            NavValue::Text(s) => Decimal::from_str(s.trim()).ok(),
            NavValue::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        }
    }
}

/// Fetch a fund's full NAV history.
///
/// Never fails: network and parse problems are logged and produce an empty
/// series, which callers treat as "skip this fund".
pub async fn fetch_nav_series(client: &Client, url: &str) -> NavSeries {
    info!("Fetching NAV history from {}", url);
    match try_fetch_nav_series(client, url).await {
        Ok(series) => {
            debug!("Fetched {} NAV points from {}", series.len(), url);
            series
        }
        Err(failure) => {
            warn!(
                url,
                category = failure.category(),
                "Failed to fetch NAV history: {}",
                failure
            );
            NavSeries::new()
        }
    }
}

async fn try_fetch_nav_series(client: &Client, url: &str) -> Result<NavSeries, FetchFailure> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchFailure::Status(response.status().as_u16()));
    }

    let body = response.text().await?;
    parse_nav_payload(&body)
}

/// Parse an endpoint payload. One malformed record rejects the whole payload.
pub fn parse_nav_payload(body: &str) -> Result<NavSeries, FetchFailure> {
    let response: NavResponse =
        serde_json::from_str(body).map_err(|e| FetchFailure::Parse(e.to_string()))?;

    let mut points = Vec::with_capacity(response.data.len());
    for record in &response.data {
        let date = parse_nav_date(&record.date)
            .ok_or_else(|| FetchFailure::Parse(format!("invalid NAV date '{}'", record.date)))?;
        let nav = record.nav.to_decimal().ok_or_else(|| {
            FetchFailure::Parse(format!("invalid NAV value on {}: {:?}", record.date, record.nav))
        })?;
        points.push((date, nav));
    }

    Ok(points.into_iter().collect())
}

/// Day-first NAV dates (`22-07-2025`, `22/07/2025`)
fn parse_nav_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_nav_payload_sorts_and_indexes() {
        let body = r#"{
            "meta": { "scheme_name": "Quant Small Cap Fund - Growth Option - Direct Plan" },
            "data": [
                { "date": "22-07-2025", "nav": "49.00000" },
                { "date": "21-07-2025", "nav": "50.00000" },
                { "date": "01-07-2025", "nav": "51.20000" }
            ],
            "status": "SUCCESS"
        }"#;

        let series = parse_nav_payload(body).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(d(2025, 7, 1)));
        assert_eq!(series.get(d(2025, 7, 21)), Some(dec!(50)));
        assert_eq!(series.get(d(2025, 7, 22)), Some(dec!(49)));
    }

    #[test]
    fn test_parse_nav_payload_accepts_numeric_nav() {
        let body = r#"{"data":[{"date":"18/07/2025","nav":48.75}]}"#;
        let series = parse_nav_payload(body).unwrap();
        assert_eq!(series.get(d(2025, 7, 18)), Some(dec!(48.75)));
    }

    #[test]
    fn test_missing_data_array_is_empty_series() {
        let series = parse_nav_payload(r#"{"status":"SUCCESS"}"#).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_malformed_record_rejects_payload() {
        let bad_nav = r#"{"data":[{"date":"22-07-2025","nav":"N.A."}]}"#;
        assert!(matches!(parse_nav_payload(bad_nav), Err(FetchFailure::Parse(_))));

        let bad_date = r#"{"data":[{"date":"2025-07-22","nav":"49.0"}]}"#;
        assert!(matches!(parse_nav_payload(bad_date), Err(FetchFailure::Parse(_))));

        assert!(matches!(parse_nav_payload("not json"), Err(FetchFailure::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_empty_series() {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let series = fetch_nav_series(&client, "http://127.0.0.1:1/mf/0").await;
        assert!(series.is_empty());
    }
}
