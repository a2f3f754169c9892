// ABOUTME: Error types for web-archive calendar lookups.
// ABOUTME: Provides WaybackError with Http, Status, Parse, and BadTimestamp variants.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to the archive's calendar API.
#[derive(Debug, Error)]
pub enum WaybackError {
    /// The calendar endpoint could not be reached or its body not read.
    #[error("calendar request failed: {0}")]
    Http(String),

    /// The calendar endpoint answered with a non-success status.
    #[error("calendar request for {url} returned status {code}")]
    Status { code: u16, url: String },

    /// The calendar payload did not match the nested-array shape.
    #[error("failed to parse calendar payload: {0}")]
    Parse(String),

    /// A capture timestamp was not a valid `YYYYMMDDHHMMSS` instant.
    #[error("invalid capture timestamp: {0}")]
    BadTimestamp(u64),
}

impl WaybackError {
    /// Creates an Http error from an underlying transport error.
    pub fn http(err: impl fmt::Display) -> Self {
        WaybackError::Http(err.to_string())
    }

    /// Creates a Parse error from an underlying decode error.
    pub fn parse(err: impl fmt::Display) -> Self {
        WaybackError::Parse(err.to_string())
    }
}
