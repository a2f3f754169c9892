// ABOUTME: CSV report writing with fixed per-driver column layouts.
// ABOUTME: Excel-style dialect: CRLF rows, every non-numeric field quoted.

//! Report files.
//!
//! Each driver writes one CSV with a fixed column layout; downstream
//! analysis scripts index columns by position, so the layouts never shift.
//! The seven article columns are part of every layout and stay blank for
//! rows that were never enriched. Ranked-list scrapes accumulate into their
//! report across runs, replays rewrite theirs from scratch, and the header
//! row is written only on request so accumulated files are not interrupted
//! by repeated headers.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ClipError;
use crate::records::Record;

/// Article columns closing every layout; blank until enrichment fills them.
const ENRICHMENT_COLUMNS: &[&str] = &[
    "path",
    "title",
    "text",
    "top_image",
    "authors",
    "summary",
    "keywords",
];

/// Which column layout a report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Live ranked-list scrape: `date,time,src,src_list,url,order,link_text`.
    RankedList,
    /// Replayed ranked list: `date,time,src,order,url,link_text`.
    ReplayRanked,
    /// Replayed homepage: `date,time,src,order,url,link_text,homepage_keywords`.
    ReplayHomepage,
}

impl ReportKind {
    /// Column names in writing order, without the trailing article columns.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::RankedList => {
                &["date", "time", "src", "src_list", "url", "order", "link_text"]
            }
            ReportKind::ReplayRanked => &["date", "time", "src", "order", "url", "link_text"],
            ReportKind::ReplayHomepage => &[
                "date",
                "time",
                "src",
                "order",
                "url",
                "link_text",
                "homepage_keywords",
            ],
        }
    }
}

/// Whether a report accumulates or starts fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Append,
    Truncate,
}

/// Settings for one report file.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub kind: ReportKind,
    pub mode: OpenMode,
    /// Write the column names as the first row.
    pub with_header: bool,
}

impl ReportOptions {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            mode: OpenMode::Append,
            with_header: false,
        }
    }
}

/// A CSV report being written.
pub struct ReportWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    kind: ReportKind,
}

impl ReportWriter {
    pub fn open(path: &Path, options: &ReportOptions) -> Result<Self, ClipError> {
        let file = match options.mode {
            OpenMode::Append => OpenOptions::new().create(true).append(true).open(path),
            OpenMode::Truncate => File::create(path),
        }
        .map_err(|err| {
            ClipError::store(path.display().to_string(), "open report", Some(err.into()))
        })?;

        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::NonNumeric)
            .terminator(Terminator::CRLF)
            .from_writer(file);

        let mut report = Self {
            writer,
            path: path.to_path_buf(),
            kind: options.kind,
        };
        if options.with_header {
            report.write_header()?;
        }
        Ok(report)
    }

    fn write_header(&mut self) -> Result<(), ClipError> {
        let mut columns: Vec<&str> = self.kind.columns().to_vec();
        columns.extend_from_slice(ENRICHMENT_COLUMNS);
        self.writer
            .write_record(&columns)
            .map_err(|err| self.store_error("write report header", err))
    }

    /// Write one record as a row.
    pub fn write(&mut self, record: &Record) -> Result<(), ClipError> {
        let mut row = self.base_row(record);
        let e = &record.enrichment;
        row.extend([
            e.path.clone(),
            e.title.clone(),
            e.text.clone(),
            e.top_image.clone(),
            e.authors.clone(),
            e.summary.clone(),
            e.keywords.clone(),
        ]);
        self.writer
            .write_record(&row)
            .map_err(|err| self.store_error("write report row", err))
    }

    /// Write a whole batch and flush it out.
    pub fn write_all(&mut self, records: &[Record]) -> Result<(), ClipError> {
        for record in records {
            self.write(record)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<(), ClipError> {
        self.writer
            .flush()
            .map_err(|err| self.store_error("flush report", err.into()))
    }

    fn base_row(&self, r: &Record) -> Vec<String> {
        match self.kind {
            ReportKind::RankedList => vec![
                r.date(),
                r.time(),
                r.src.clone(),
                r.src_list.clone(),
                r.url.clone(),
                r.order.to_string(),
                r.link_text.clone(),
            ],
            ReportKind::ReplayRanked => vec![
                r.date(),
                r.time(),
                r.src.clone(),
                r.order.to_string(),
                r.url.clone(),
                r.link_text.clone(),
            ],
            ReportKind::ReplayHomepage => vec![
                r.date(),
                r.time(),
                r.src.clone(),
                r.order.to_string(),
                r.url.clone(),
                r.link_text.clone(),
                r.homepage_keywords.clone(),
            ],
        }
    }

    fn store_error(&self, op: &str, err: csv::Error) -> ClipError {
        ClipError::store(self.path.display().to_string(), op, Some(err.into()))
    }
}
