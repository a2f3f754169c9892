// ABOUTME: Main library entry point for the newsrack clipper engine.
// ABOUTME: Re-exports the public API: fetchers, rule tables, link extraction, records, reports.

//! Clipper - the scraping engine behind the newsrack drivers.
//!
//! The pipeline runs in stages: fetch a page (plain HTTP or through a
//! rendering WebDriver), resolve the extraction rule that was valid at the
//! page's timestamp, pull candidate links out, stamp them into ordered
//! records, and write them to a CSV report, optionally enriched with the
//! downloaded article behind each link.
//!
//! # Example
//!
//! ```no_run
//! use newsrack_clipper::fetch::{FetchConfig, HttpFetcher, PageFetcher};
//! use newsrack_clipper::links;
//! use newsrack_clipper::rules::loader::load_homepage_table;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), newsrack_clipper::ClipError> {
//!     let table = load_homepage_table();
//!     let rule = table.resolve("nyt", chrono::Utc::now().naive_utc())?.compile()?;
//!     let fetcher = HttpFetcher::new(&FetchConfig::default())?;
//!     let html = fetcher.get("https://www.nytimes.com/").await?;
//!     for link in links::extract_html(&html, &rule) {
//!         println!("{} -> {}", link.text, link.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod capture;
pub mod error;
pub mod fetch;
pub mod links;
pub mod normalize;
pub mod records;
pub mod report;
pub mod retry;
pub mod rules;
pub mod timestamp;

pub use crate::article::ArticleExtractor;
pub use crate::capture::{save_html, CaptureName, SaveOutcome};
pub use crate::error::{ClipError, ErrorCode};
pub use crate::fetch::{fetch_or_empty, FetchConfig, HttpFetcher, PageFetcher, RenderFetcher};
pub use crate::links::CandidateLink;
pub use crate::records::{build, enrich, enrich_all, BuildOptions, DedupSet, DumpOptions, Record};
pub use crate::report::{OpenMode, ReportKind, ReportOptions, ReportWriter};
pub use crate::retry::RetryPolicy;
pub use crate::rules::{ExtractionRule, RuleTable};
