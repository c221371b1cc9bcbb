//! NAV deviation and month-to-date trend analysis
//!
//! Official NAVs are published after the close, so intraday the proxy move
//! (`calc_drop_pct`) is the leading signal. Once the day's official NAV is
//! out, `deviation_pct = calc_drop_pct - official_drop_pct` measures how far
//! the proxy drifted from the confirmed move.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calendar::RunClock;
use crate::nav::NavSeries;
use crate::valuation::PortfolioValuation;

/// Analysis result for one fund. Every derived field is independently
/// `None` when one of its inputs is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationReport {
    pub fund_key: String,
    pub nav_date: NaiveDate,
    pub run_time: NaiveTime,
    pub prev_date: NaiveDate,
    pub month_start_date: NaiveDate,
    pub nav_month_start: Option<Decimal>,
    pub nav_yesterday: Option<Decimal>,
    pub nav_today: Option<Decimal>,
    pub official_drop_pct: Option<Decimal>,
    pub calc_drop_pct: Option<Decimal>,
    pub deviation_pct: Option<Decimal>,
    pub month_trend_pct: Option<Decimal>,
    pub valuation: PortfolioValuation,
}

impl DeviationReport {
    /// Month-to-date section is shown only with both endpoints.
    pub fn month_trend(&self) -> Option<(Decimal, Decimal, Decimal)> {
        match (self.nav_month_start, self.nav_yesterday, self.month_trend_pct) {
            (Some(start), Some(yesterday), Some(pct)) => Some((start, yesterday, pct)),
            _ => None,
        }
    }
}

/// `(to - from) / from * 100`; `None` when `from` is zero.
pub fn pct_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        return None;
    }
    Some((to - from) / from * Decimal::ONE_HUNDRED)
}

fn pct_between(from: Option<Decimal>, to: Option<Decimal>) -> Option<Decimal> {
    pct_change(from?, to?)
}

/// Compare the official NAV series against the holdings valuation.
pub fn analyze(
    fund_key: &str,
    nav_series: &NavSeries,
    valuation: &PortfolioValuation,
    clock: &RunClock,
) -> DeviationReport {
    let prev_date = clock.prev_date();
    let month_start_date = clock.month_start_date();

    let nav_month_start = nav_series.get(month_start_date);
    let nav_yesterday = nav_series.get(prev_date);
    let nav_today = nav_series.get(clock.nav_date);

    let month_trend_pct = pct_between(nav_month_start, nav_yesterday);
    let official_drop_pct = pct_between(nav_yesterday, nav_today);
    let calc_drop_pct = valuation.change_pct();
    // TODO: calibrate the calc - official sign against labelled NAV days
    let deviation_pct = match (calc_drop_pct, official_drop_pct) {
        (Some(calc), Some(official)) => Some(calc - official),
        _ => None,
    };

    DeviationReport {
        fund_key: fund_key.to_string(),
        nav_date: clock.nav_date,
        run_time: clock.run_time,
        prev_date,
        month_start_date,
        nav_month_start,
        nav_yesterday,
        nav_today,
        official_drop_pct,
        calc_drop_pct,
        deviation_pct,
        month_trend_pct,
        valuation: *valuation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn clock() -> RunClock {
        RunClock::backtest(d(2025, 7, 22), NaiveTime::from_hms_opt(15, 50, 0).unwrap())
    }

    fn valuation(previous: Decimal, live: Decimal) -> PortfolioValuation {
        PortfolioValuation {
            previous_value: previous,
            live_value: live,
            previous_priced: 1,
            live_priced: 1,
        }
    }

    #[test]
    fn test_end_to_end_without_month_start() {
        let series: NavSeries = vec![(d(2025, 7, 21), dec!(50.0)), (d(2025, 7, 22), dec!(49.0))]
            .into_iter()
            .collect();

        let report = analyze("quant-small-cap", &series, &valuation(dec!(100), dec!(98)), &clock());

        assert_eq!(report.prev_date, d(2025, 7, 21));
        assert_eq!(report.month_start_date, d(2025, 7, 1));
        assert_eq!(report.official_drop_pct, Some(dec!(-2)));
        assert_eq!(report.calc_drop_pct, Some(dec!(-2)));
        assert_eq!(report.deviation_pct, Some(dec!(0)));
        assert_eq!(report.nav_month_start, None);
        assert_eq!(report.month_trend_pct, None);
        assert!(report.month_trend().is_none());
    }

    #[test]
    fn test_full_series_gives_all_fields() {
        let series: NavSeries = vec![
            (d(2025, 7, 1), dec!(40)),
            (d(2025, 7, 21), dec!(50)),
            (d(2025, 7, 22), dec!(51)),
        ]
        .into_iter()
        .collect();

        let report = analyze("f", &series, &valuation(dec!(200), dec!(203)), &clock());

        assert_eq!(report.month_trend_pct, Some(dec!(25)));
        assert_eq!(report.official_drop_pct, Some(dec!(2)));
        assert_eq!(report.calc_drop_pct, Some(dec!(1.5)));
        assert_eq!(report.deviation_pct, Some(dec!(-0.5)));
        assert_eq!(report.month_trend(), Some((dec!(40), dec!(50), dec!(25))));
    }

    #[test]
    fn test_todays_nav_not_yet_published() {
        let series: NavSeries = vec![(d(2025, 7, 1), dec!(40)), (d(2025, 7, 21), dec!(50))]
            .into_iter()
            .collect();

        let report = analyze("f", &series, &valuation(dec!(100), dec!(97)), &clock());

        assert_eq!(report.official_drop_pct, None);
        assert_eq!(report.calc_drop_pct, Some(dec!(-3)));
        assert_eq!(report.deviation_pct, None);
        assert_eq!(report.month_trend_pct, Some(dec!(25)));
    }

    #[test]
    fn test_zero_previous_value_has_no_calc_drop() {
        let series: NavSeries = vec![(d(2025, 7, 21), dec!(50)), (d(2025, 7, 22), dec!(49))]
            .into_iter()
            .collect();

        let report = analyze("f", &series, &PortfolioValuation::default(), &clock());

        assert_eq!(report.calc_drop_pct, None);
        assert_eq!(report.deviation_pct, None);
        assert_eq!(report.official_drop_pct, Some(dec!(-2)));
    }

    #[test]
    fn test_no_nearest_date_fallback() {
        // NAV for Friday 18th exists but prev trading day of 22nd is 21st
        let series: NavSeries = vec![(d(2025, 7, 18), dec!(50)), (d(2025, 7, 22), dec!(49))]
            .into_iter()
            .collect();

        let report = analyze("f", &series, &valuation(dec!(1), dec!(1)), &clock());

        assert_eq!(report.nav_yesterday, None);
        assert_eq!(report.official_drop_pct, None);
        assert_eq!(report.calc_drop_pct, Some(dec!(0)));
    }

    #[test]
    fn test_monday_compares_against_friday() {
        let monday = RunClock::backtest(d(2025, 7, 21), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let series: NavSeries = vec![(d(2025, 7, 18), dec!(80)), (d(2025, 7, 21), dec!(84))]
            .into_iter()
            .collect();

        let report = analyze("f", &series, &valuation(dec!(10), dec!(10)), &monday);

        assert_eq!(report.prev_date, d(2025, 7, 18));
        assert_eq!(report.official_drop_pct, Some(dec!(5)));
    }

    #[test]
    fn test_pct_change_zero_base() {
        assert_eq!(pct_change(Decimal::ZERO, dec!(5)), None);
        assert_eq!(pct_change(dec!(4), dec!(5)), Some(dec!(25)));
    }
}
