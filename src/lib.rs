//! Navdrift - intraday mutual fund NAV deviation estimator
//!
//! This library values a fund's disclosed holdings at previous-close and
//! live prices, and compares that proxy move against the fund's official
//! NAV history to report a deviation and a month-to-date trend.

pub mod calendar;
pub mod config;
pub mod error;
pub mod importers;
pub mod nav;
pub mod pipeline;
pub mod prerun;
pub mod pricing;
pub mod reports;
pub mod utils;
pub mod valuation;
