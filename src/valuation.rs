//! Holdings-weighted portfolio valuation
//!
//! The "calculated NAV" is the weight-averaged price of a fund's disclosed
//! holdings, computed twice: once at the previous close and once live.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::RunClock;
use crate::pricing::{market_symbol, QuoteSource};

/// One disclosed holding. Weights need not sum to 1 (cash is not listed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    /// Fraction of the portfolio, e.g. 0.0525 for 5.25%
    pub weight: Decimal,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, weight: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
        }
    }

    /// Build from a declared percentage (5.25 -> 0.0525)
    pub fn from_percent(ticker: impl Into<String>, percent: Decimal) -> Self {
        Self::new(ticker, percent / Decimal::ONE_HUNDRED)
    }
}

/// Weighted previous-close and live sums
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub previous_value: Decimal,
    pub live_value: Decimal,
    /// Holdings that had a previous-close price
    pub previous_priced: usize,
    /// Holdings that had a live price
    pub live_priced: usize,
}

impl PortfolioValuation {
    /// A zero previous value carries no signal, not a 0% move.
    pub fn has_signal(&self) -> bool {
        !self.previous_value.is_zero()
    }

    /// `(live - previous) / previous * 100`, or `None` without a previous value.
    pub fn change_pct(&self) -> Option<Decimal> {
        if !self.has_signal() {
            return None;
        }
        Some((self.live_value - self.previous_value) / self.previous_value * Decimal::ONE_HUNDRED)
    }
}

/// Value a holding list at previous close and live.
///
/// Each holding is priced sequentially. A missing price contributes zero to
/// its own side only; the two sides accumulate independently.
pub async fn compute_portfolio_valuation<S: QuoteSource + ?Sized>(
    source: &S,
    holdings: &[Holding],
    clock: &RunClock,
    market_suffix: &str,
) -> PortfolioValuation {
    info!("Valuing {} holdings", holdings.len());

    let mut valuation = PortfolioValuation::default();

    for holding in holdings {
        let symbol = market_symbol(&holding.ticker, market_suffix);

        if let Some(quote) = source.previous_close(&symbol, clock).await {
            valuation.previous_value += quote.price * holding.weight;
            valuation.previous_priced += 1;
        }
        if let Some(quote) = source.live_price(&symbol, clock).await {
            valuation.live_value += quote.price * holding.weight;
            valuation.live_priced += 1;
        }
    }

    debug!(
        "Valuation: previous {} ({} priced), live {} ({} priced)",
        valuation.previous_value,
        valuation.previous_priced,
        valuation.live_value,
        valuation.live_priced
    );
    valuation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::testing::StaticQuotes;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn clock() -> RunClock {
        RunClock::backtest(
            NaiveDate::from_ymd_opt(2025, 7, 22).unwrap(),
            NaiveTime::from_hms_opt(15, 50, 0).unwrap(),
        )
    }

    #[test]
    fn test_holding_from_percent() {
        assert_eq!(Holding::from_percent("TCS", dec!(5.25)).weight, dec!(0.0525));
        assert_eq!(Holding::from_percent("TCS", dec!(0)).weight, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_weighted_previous_and_live_values() {
        let source = StaticQuotes::default()
            .with("AAA.NS", Some(dec!(100)), Some(dec!(98)))
            .with("BBB.NS", Some(dec!(200)), Some(dec!(204)));
        let holdings = vec![
            Holding::from_percent("aaa", dec!(60)),
            Holding::from_percent("bbb", dec!(40)),
        ];

        let v = compute_portfolio_valuation(&source, &holdings, &clock(), ".NS").await;

        assert_eq!(v.previous_value, dec!(140));
        assert_eq!(v.live_value, dec!(140.4));
        assert_eq!((v.previous_priced, v.live_priced), (2, 2));
    }

    #[tokio::test]
    async fn test_all_prices_unavailable_is_zero() {
        let source = StaticQuotes::default();
        let holdings = vec![
            Holding::from_percent("AAA", dec!(60)),
            Holding::from_percent("BBB", dec!(40)),
        ];

        let v = compute_portfolio_valuation(&source, &holdings, &clock(), ".NS").await;

        assert_eq!(v.previous_value, Decimal::ZERO);
        assert_eq!(v.live_value, Decimal::ZERO);
        assert!(!v.has_signal());
        assert_eq!(v.change_pct(), None);
    }

    #[tokio::test]
    async fn test_sides_accumulate_independently() {
        // AAA has no live price, BBB has no previous close
        let source = StaticQuotes::default()
            .with("AAA.NS", Some(dec!(100)), None)
            .with("BBB.NS", None, Some(dec!(50)));
        let holdings = vec![
            Holding::from_percent("AAA", dec!(50)),
            Holding::from_percent("BBB", dec!(50)),
        ];

        let v = compute_portfolio_valuation(&source, &holdings, &clock(), ".NS").await;

        assert_eq!(v.previous_value, dec!(50));
        assert_eq!(v.live_value, dec!(25));
        assert_eq!((v.previous_priced, v.live_priced), (1, 1));
    }

    #[tokio::test]
    async fn test_empty_holdings_have_no_signal() {
        let source = StaticQuotes::default();
        let v = compute_portfolio_valuation(&source, &[], &clock(), ".NS").await;
        assert_eq!(v, PortfolioValuation::default());
        assert_eq!(source.call_count(), 0);
    }

    #[test]
    fn test_change_pct() {
        let v = PortfolioValuation {
            previous_value: dec!(100),
            live_value: dec!(98),
            ..Default::default()
        };
        assert_eq!(v.change_pct(), Some(dec!(-2)));
    }
}
