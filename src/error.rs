//! Error handling for navdrift
//!
//! Defines the typed configuration/date errors that abort a run and
//! establishes a unified Result type using anyhow for context chaining.
//! Transient fetch failures live in `pricing::FetchFailure` and never
//! escape the fetcher boundary.

use thiserror::Error;

/// Errors that indicate a misconfigured run rather than missing data
#[derive(Error, Debug)]
pub enum NavError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}': expected HH:MM:SS")]
    InvalidTime(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for navdrift operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = NavError::InvalidDate("22/07/2025".to_string());
        assert_eq!(
            err.to_string(),
            "invalid date '22/07/2025': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(NavError::Config("missing [sources]".to_string())).context("failed to load config");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to load config"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("missing [sources]"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_nav_error_variants() {
        assert!(NavError::InvalidTime("25:00".to_string())
            .to_string()
            .starts_with("invalid time"));
        assert!(NavError::Config("x".to_string())
            .to_string()
            .starts_with("config error"));
    }
}
