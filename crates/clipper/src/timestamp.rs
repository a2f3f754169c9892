// ABOUTME: Compact timestamp format shared by epoch starts and capture file names.
// ABOUTME: Provides parse/format helpers and a serde adapter for `YYYYMMDD_HHMMSS` strings.

use chrono::NaiveDateTime;

use crate::error::ClipError;

/// The on-disk timestamp format: `20151230_120000`.
pub const TS_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Parse a `YYYYMMDD_HHMMSS` timestamp.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ClipError> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map_err(|e| ClipError::rules(s, "parse timestamp", Some(e.into())))
}

/// Format a timestamp as `YYYYMMDD_HHMMSS`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// Serde adapter for timestamp fields stored in the compact format.
pub mod serde_ts {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::TS_FORMAT;

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TS_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TS_FORMAT).map_err(serde::de::Error::custom)
    }
}
