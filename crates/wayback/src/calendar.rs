// ABOUTME: Client for the archive's calendar captures API.
// ABOUTME: Lists the capture timestamps recorded for a URL during one year.

//! Calendar lookups.
//!
//! `GET {base}/__wb/calendarcaptures?url={target}&selected_year={year}`
//! answers with arrays nested three deep (months, weeks, days); a day cell
//! is either null or an object whose `ts` list holds that day's capture
//! timestamps.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::WaybackError;
use crate::snapshot::Snapshot;

/// Browser user agent for calendar requests; the endpoint answers plain
/// clients inconsistently.
const CALENDAR_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/35.0.1916.47 Safari/537.36";

const CALENDAR_TIMEOUT: Duration = Duration::from_secs(30);

/// A day cell of the calendar grid. Cells without captures omit `ts`.
#[derive(Debug, Deserialize)]
struct DayCell {
    #[serde(default)]
    ts: Vec<u64>,
}

type CalendarGrid = Vec<Vec<Vec<Option<DayCell>>>>;

/// Calendar API client for one archive host.
pub struct SnapshotIndex {
    client: reqwest::Client,
    base: String,
}

impl SnapshotIndex {
    /// Creates a client for the archive at `base`.
    pub fn new(base: impl Into<String>) -> Result<Self, WaybackError> {
        let client = reqwest::Client::builder()
            .user_agent(CALENDAR_USER_AGENT)
            .timeout(CALENDAR_TIMEOUT)
            .build()
            .map_err(WaybackError::http)?;
        Ok(Self {
            client,
            base: base.into(),
        })
    }

    /// The archive host this client talks to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The calendar endpoint URL for `target` during `year`.
    pub fn calendar_url(&self, target: &str, year: i32) -> String {
        format!(
            "{}/__wb/calendarcaptures?url={}&selected_year={}",
            self.base, target, year
        )
    }

    /// Every capture timestamp recorded for `target` during `year`, in
    /// calendar order.
    pub async fn lookup(&self, target: &str, year: i32) -> Result<Vec<Snapshot>, WaybackError> {
        let url = self.calendar_url(target, year);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(WaybackError::http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(WaybackError::Status {
                code: status.as_u16(),
                url,
            });
        }
        let body = response.text().await.map_err(WaybackError::http)?;
        let grid: CalendarGrid = serde_json::from_str(&body).map_err(WaybackError::parse)?;
        let snapshots = collect(&grid);
        debug!("{}: {} captures in {}", target, snapshots.len(), year);
        Ok(snapshots)
    }
}

fn collect(grid: &CalendarGrid) -> Vec<Snapshot> {
    let mut snapshots = Vec::new();
    for month in grid {
        for week in month {
            for day in week.iter().flatten() {
                snapshots.extend(day.ts.iter().map(|&ts| Snapshot::new(ts)));
            }
        }
    }
    snapshots
}
