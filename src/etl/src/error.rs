//! Typed errors for the fetch and configuration boundaries.
//!
//! Everything above these boundaries uses `anyhow`.

use thiserror::Error;

/// Failure returned by a page fetch or a geocode request.
///
/// A timeout and a malformed response are handled the same way by callers:
/// the page or record is skipped. Only `RateLimited` is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("rate limited by {0}")]
    RateLimited(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether the request may succeed if repeated after a delay
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::RateLimited(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout(e.to_string());
        }
        if let Some(status) = e.status() {
            if status.as_u16() == 429 {
                return FetchError::RateLimited(e.url().map(|u| u.to_string()).unwrap_or_default());
            }
            return FetchError::Status(status.as_u16());
        }
        if e.is_decode() {
            return FetchError::Decode(e.to_string());
        }
        FetchError::Transport(e.to_string())
    }
}

/// Invalid run parameters, reported before any request is made
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown league `{0}` (expected one of cfb, nfl, mlb, nba)")]
    UnknownLeague(String),

    #[error("{league} schedules are indexed by {expected}, not {given}")]
    PeriodMismatch {
        league: String,
        expected: &'static str,
        given: &'static str,
    },

    #[error("week count must be at least 1")]
    ZeroWeeks,

    #[error("date range is inverted: {start} is after {end}")]
    InvertedRange { start: String, end: String },

    #[error("a {0} schedule needs {1}")]
    MissingPeriod(String, &'static str),
}
