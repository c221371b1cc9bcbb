use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{quote_or_none, FetchFailure, PriceQuote, QuoteKind, QuoteSource};
use crate::calendar::RunClock;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Yahoo Finance chart API quote source
pub struct YahooQuotes {
    client: Client,
    base_url: String,
}

impl YahooQuotes {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: CHART_URL.to_string(),
        }
    }

    /// Point the source at a different chart endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_chart(&self, url: &str) -> Result<ChartResult, FetchFailure> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchFailure::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_chart(&body)
    }

    /// Daily closes with bar dates in `[from, to)`.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, FetchFailure> {
        info!(
            "Fetching daily closes for {} from {} to {}",
            symbol, from, to
        );

        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            symbol,
            from.and_time(NaiveTime::MIN).and_utc().timestamp(),
            to.and_time(NaiveTime::MIN).and_utc().timestamp()
        );

        let result = self.fetch_chart(&url).await?;
        let closes = daily_closes(&result, from, to)?;
        debug!("Fetched {} daily closes for {}", closes.len(), symbol);
        Ok(closes)
    }

    async fn fetch_current_price(&self, symbol: &str) -> Result<Decimal, FetchFailure> {
        info!("Fetching current price for {} from Yahoo Finance", symbol);

        let url = format!("{}/{}?range=1d&interval=1m", self.base_url, symbol);
        let result = self.fetch_chart(&url).await?;
        latest_price(&result)
    }
}

#[async_trait]
impl QuoteSource for YahooQuotes {
    async fn previous_close(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote> {
        let result = self
            .fetch_daily_closes(symbol, clock.prev_date(), clock.nav_date)
            .await
            .and_then(last_close);
        quote_or_none(symbol, QuoteKind::PreviousClose, result)
    }

    async fn live_price(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote> {
        let result = if clock.backtest {
            self.fetch_daily_closes(symbol, clock.nav_date, clock.nav_date + Duration::days(1))
                .await
                .and_then(last_close)
        } else {
            self.fetch_current_price(symbol).await
        };
        quote_or_none(symbol, QuoteKind::Live, result)
    }
}

pub(crate) fn parse_chart(body: &str) -> Result<ChartResult, FetchFailure> {
    let data: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| FetchFailure::Parse(e.to_string()))?;

    if let Some(error) = data.chart.error {
        return Err(FetchFailure::Provider(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    data.chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(FetchFailure::Empty)
}

fn close_series(result: &ChartResult) -> impl Iterator<Item = Option<f64>> + '_ {
    result
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.as_ref())
        .into_iter()
        .flatten()
        .copied()
}

pub(crate) fn daily_closes(
    result: &ChartResult,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(NaiveDate, Decimal)>, FetchFailure> {
    let timestamps = result.timestamp.as_deref().unwrap_or_default();

    let mut closes = Vec::new();
    for (&timestamp, close) in timestamps.iter().zip(close_series(result)) {
        let date = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| FetchFailure::Parse(format!("invalid timestamp {}", timestamp)))?
            .date_naive();
        if date < from || date >= to {
            continue;
        }
        // Null closes are bars with no trades
        if let Some(price) = close.and_then(Decimal::from_f64_retain) {
            closes.push((date, price));
        }
    }
    Ok(closes)
}

fn last_close(closes: Vec<(NaiveDate, Decimal)>) -> Result<Decimal, FetchFailure> {
    closes
        .last()
        .map(|(_, price)| *price)
        .ok_or(FetchFailure::Empty)
}

/// `regularMarketPrice`, falling back to the last non-null intraday close.
pub(crate) fn latest_price(result: &ChartResult) -> Result<Decimal, FetchFailure> {
    result
        .meta
        .regular_market_price
        .or_else(|| close_series(result).flatten().last())
        .and_then(Decimal::from_f64_retain)
        .ok_or(FetchFailure::Empty)
}
