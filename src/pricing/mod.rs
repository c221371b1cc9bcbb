// Pricing module - market-data quotes and official NAV history

pub mod mfapi;
pub mod yahoo;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calendar::RunClock;

pub use yahoo::YahooQuotes;

/// Which side of the valuation a quote feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuoteKind {
    PreviousClose,
    Live,
}

impl QuoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteKind::PreviousClose => "previous close",
            QuoteKind::Live => "live",
        }
    }
}

/// A single price for a market symbol at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: Decimal,
    pub kind: QuoteKind,
}

/// Transient fetch failures. These never reach the caller of a fetcher:
/// they are logged and turned into an absent value.
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty result")]
    Empty,
}

impl FetchFailure {
    pub fn category(&self) -> &'static str {
        match self {
            FetchFailure::Network(_) => "network",
            FetchFailure::Status(_) => "status",
            FetchFailure::Parse(_) => "parse",
            FetchFailure::Provider(_) => "provider",
            FetchFailure::Empty => "empty",
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchFailure::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::Status(status.as_u16())
        } else {
            FetchFailure::Network(err.to_string())
        }
    }
}

/// Collapse a fetch result into an optional quote, logging the failure.
pub(crate) fn quote_or_none(
    symbol: &str,
    kind: QuoteKind,
    result: Result<Decimal, FetchFailure>,
) -> Option<PriceQuote> {
    match result {
        Ok(price) => Some(PriceQuote {
            symbol: symbol.to_string(),
            price,
            kind,
        }),
        Err(failure) => {
            warn!(
                symbol,
                category = failure.category(),
                "No {} price: {}",
                kind.as_str(),
                failure
            );
            None
        }
    }
}

/// Source of previous-close and live prices.
///
/// Implementations must not fail: an unavailable price is `None`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Close on the trading day before `clock.nav_date`.
    async fn previous_close(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote>;

    /// Latest traded price now, or the close of `clock.nav_date` when backtesting.
    async fn live_price(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote>;
}

/// Tradable symbol for an exchange ticker: upper-cased plus the market suffix.
pub fn market_symbol(ticker: &str, suffix: &str) -> String {
    format!("{}{}", ticker.trim().to_uppercase(), suffix)
}

/// Per-run memo over another source.
///
/// Absent quotes are memoized too, so a failed symbol is not retried
/// for another fund within the same run.
pub struct CachedQuotes<S> {
    inner: S,
    cache: Mutex<HashMap<(String, QuoteKind), Option<PriceQuote>>>,
}

impl<S: QuoteSource> CachedQuotes<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn cached(&self, symbol: &str, kind: QuoteKind) -> Option<Option<PriceQuote>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(&(symbol.to_string(), kind)).cloned()
    }

    fn store(&self, symbol: &str, kind: QuoteKind, quote: &Option<PriceQuote>) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert((symbol.to_string(), kind), quote.clone());
    }
}

#[async_trait]
impl<S: QuoteSource> QuoteSource for CachedQuotes<S> {
    async fn previous_close(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote> {
        if let Some(hit) = self.cached(symbol, QuoteKind::PreviousClose) {
            debug!("Using cached previous close for {}", symbol);
            return hit;
        }
        let quote = self.inner.previous_close(symbol, clock).await;
        self.store(symbol, QuoteKind::PreviousClose, &quote);
        quote
    }

    async fn live_price(&self, symbol: &str, clock: &RunClock) -> Option<PriceQuote> {
        if let Some(hit) = self.cached(symbol, QuoteKind::Live) {
            debug!("Using cached live price for {}", symbol);
            return hit;
        }
        let quote = self.inner.live_price(symbol, clock).await;
        self.store(symbol, QuoteKind::Live, &quote);
        quote
    }
}
