// ABOUTME: Capture timestamps and archived-page URL helpers.
// ABOUTME: A snapshot is a 14-digit instant; /web/{ts}/{url} replays it.

//! Archived captures.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::WaybackError;

/// Compact instant format used throughout the archive's URLs.
const SNAPSHOT_TS_FORMAT: &str = "%Y%m%d%H%M%S";

/// One archived capture of a page, identified by its 14-digit timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot {
    pub timestamp: u64,
}

impl Snapshot {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    /// The capture instant. Fails when the digits do not name a real date
    /// and time.
    pub fn datetime(&self) -> Result<NaiveDateTime, WaybackError> {
        NaiveDateTime::parse_from_str(&format!("{:014}", self.timestamp), SNAPSHOT_TS_FORMAT)
            .map_err(|_| WaybackError::BadTimestamp(self.timestamp))
    }

    /// Archive-relative replay path for this capture of `target`.
    pub fn path(&self, target: &str) -> String {
        format!("/web/{}/{}", self.timestamp, target)
    }

    /// Absolute replay URL for this capture of `target`.
    pub fn url(&self, base: &str, target: &str) -> String {
        format!("{}{}", base, self.path(target))
    }

    /// Whether the capture date falls inside `[begin, end)`: a capture
    /// dated exactly `end` is out, one dated `begin` is in. Garbage
    /// timestamps never fall inside any window.
    pub fn in_window(&self, begin: NaiveDate, end: NaiveDate) -> bool {
        match self.datetime() {
            Ok(dt) => {
                let date = dt.date();
                begin <= date && date < end
            }
            Err(_) => false,
        }
    }
}
