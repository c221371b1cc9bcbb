//! Trading-calendar helpers
//!
//! Weekend-only calendar: Saturdays and Sundays are the only non-trading
//! days. Exchange holidays are not modelled.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

use crate::error::NavError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Most recent weekday strictly before `date`.
pub fn previous_trading_day(date: NaiveDate) -> NaiveDate {
    let mut d = date - Duration::days(1);
    while is_weekend(d) {
        d -= Duration::days(1);
    }
    d
}

/// First day of `date`'s month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, NavError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| NavError::InvalidDate(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, NavError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| NavError::InvalidTime(s.to_string()))
}

/// Which moment a run treats as "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunClock {
    pub nav_date: NaiveDate,
    pub run_time: NaiveTime,
    /// Backtest runs price "live" from the close of `nav_date`.
    pub backtest: bool,
}

impl RunClock {
    pub fn live() -> Self {
        let now = Local::now().naive_local();
        Self {
            nav_date: now.date(),
            run_time: now.time(),
            backtest: false,
        }
    }

    pub fn backtest(nav_date: NaiveDate, run_time: NaiveTime) -> Self {
        Self {
            nav_date,
            run_time,
            backtest: true,
        }
    }

    pub fn prev_date(&self) -> NaiveDate {
        previous_trading_day(self.nav_date)
    }

    pub fn month_start_date(&self) -> NaiveDate {
        month_start(self.nav_date)
    }
}
