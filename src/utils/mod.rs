//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of rupee amounts and percentages throughout the application.

use rust_decimal::{Decimal, RoundingStrategy};

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Format as Indian Rupee with symbol: "₹1,23,456.78"
///
/// Uses Indian digit grouping: the last three integer digits form one
/// group, every group before that has two digits.
///
/// # Examples
/// ```
/// use navdrift::utils::format_inr;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_inr(dec!(49.5)), "₹49.50");
/// assert_eq!(format_inr(dec!(1234567.891)), "₹12,34,567.89");
/// assert_eq!(format_inr(dec!(-1500)), "-₹1,500.00");
/// ```
pub fn format_inr(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };

    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    format!("{}₹{}.{}", sign, group_indian(integer_part), decimal_part)
}

/// Signed percentage with two decimals: "+1.25%", "-0.40%"
///
/// # Examples
/// ```
/// use navdrift::utils::format_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_pct(dec!(-2)), "-2.00%");
/// assert_eq!(format_pct(dec!(0.125)), "+0.13%");
/// ```
pub fn format_pct(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded < Decimal::ZERO { "-" } else { "+" };
    format!("{}{:.2}%", sign, rounded.abs())
}
