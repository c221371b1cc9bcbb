//! Official NAV history for a single fund

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Date-ordered official NAV series.
///
/// Fetched once per fund per run and never mutated afterwards. Lookups are
/// exact-date only: no interpolation and no nearest-date fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavSeries {
    points: BTreeMap<NaiveDate, Decimal>,
}

impl NavSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<Decimal> {
        self.points.get(&date).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }
}

impl FromIterator<(NaiveDate, Decimal)> for NavSeries {
    /// Later duplicates of a date win.
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_series_is_sorted_regardless_of_input_order() {
        let series: NavSeries = vec![
            (d(2025, 7, 22), dec!(49.0)),
            (d(2025, 7, 1), dec!(51.2)),
            (d(2025, 7, 21), dec!(50.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(d(2025, 7, 1)));
        assert_eq!(series.last_date(), Some(d(2025, 7, 22)));
    }

    #[test]
    fn test_missing_date_is_none() {
        let series: NavSeries = vec![(d(2025, 7, 21), dec!(50.0))].into_iter().collect();
        assert_eq!(series.get(d(2025, 7, 21)), Some(dec!(50.0)));
        assert_eq!(series.get(d(2025, 7, 20)), None);
        assert!(NavSeries::new().is_empty());
    }
}
