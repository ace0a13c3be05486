//! Error types for feed decoding, descriptor parsing, probing and persistence
//!
//! Errors fall into three groups:
//! - **Fatal input errors**: `FeedFetch`, `FeedDecode`. The feed itself is unusable.
//! - **Record errors**: `InvalidFormat`, `InvalidField`, `Base64DecodeError`. One descriptor
//!   line is dropped and the run continues (see [`SelectorError::is_record_error`]).
//! - **Selection errors**: `NoCandidates`, plus `JsonError` / `IoError` when persisting.
//!
//! `ProbeFailure` is recovered per candidate and only surfaces from [`crate::Prober`] calls.

use thiserror::Error;

/// Result type for selector operations
pub type Result<T> = std::result::Result<T, SelectorError>;

/// Errors that can occur while selecting an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The subscription payload could not be retrieved
    #[error("Feed fetch error: {0}")]
    FeedFetch(String),
    /// The subscription payload is not valid base64 framing
    #[error("Feed decode error: {reason}; payload: {payload:?}")]
    FeedDecode {
        /// Raw payload as received (lossy UTF-8)
        payload: String,
        /// What went wrong
        reason: String,
    },
    /// Malformed descriptor (e.g. too few fields)
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Invalid descriptor field value (e.g. port out of range)
    #[error("Invalid field value: {0}")]
    InvalidField(String),
    /// Base64 decoding error on a feed line or field
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(String),
    /// A probe could not be issued or did not complete in time
    #[error("Probe failure: {0}")]
    ProbeFailure(String),
    /// Nothing to rank
    #[error("No endpoint candidates were parsed from the feed")]
    NoCandidates,
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

impl SelectorError {
    /// True for errors that only invalidate a single descriptor line.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            SelectorError::InvalidFormat(_)
                | SelectorError::InvalidField(_)
                | SelectorError::Base64DecodeError(_)
        )
    }
}

impl From<base64::DecodeError> for SelectorError {
    fn from(err: base64::DecodeError) -> Self {
        SelectorError::Base64DecodeError(err.to_string())
    }
}

impl From<serde_json::Error> for SelectorError {
    fn from(err: serde_json::Error) -> Self {
        SelectorError::JsonError(err.to_string())
    }
}

impl From<std::num::ParseIntError> for SelectorError {
    fn from(err: std::num::ParseIntError) -> Self {
        SelectorError::InvalidField(format!("Parse integer error: {}", err))
    }
}

impl From<std::io::Error> for SelectorError {
    fn from(err: std::io::Error) -> Self {
        SelectorError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for SelectorError {
    fn from(err: reqwest::Error) -> Self {
        SelectorError::FeedFetch(err.to_string())
    }
}
