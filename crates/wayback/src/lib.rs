// ABOUTME: Web-archive lookups for the newsrack drivers.
// ABOUTME: Calendar capture queries and archived-page URL helpers.

//! Wayback - calendar lookups against a public web archive.
//!
//! The archive records captures of a page over time. [`SnapshotIndex`]
//! asks the calendar API which capture timestamps exist for a URL during a
//! year; a [`Snapshot`] turns one of those timestamps back into the
//! archived page's replay URL.
//!
//! # Example
//!
//! ```no_run
//! use newsrack_wayback::{SnapshotIndex, DEFAULT_ARCHIVE_BASE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), newsrack_wayback::WaybackError> {
//!     let index = SnapshotIndex::new(DEFAULT_ARCHIVE_BASE)?;
//!     for snapshot in index.lookup("http://www.nytimes.com/", 2012).await? {
//!         println!("{}", snapshot.url(DEFAULT_ARCHIVE_BASE, "http://www.nytimes.com/"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod error;
pub mod snapshot;

pub use calendar::SnapshotIndex;
pub use error::WaybackError;
pub use snapshot::Snapshot;

/// Default public archive host.
pub const DEFAULT_ARCHIVE_BASE: &str = "http://web.archive.org";
