// ABOUTME: Operator-supplied source lists, one CSV row per scrape target.
// ABOUTME: Live rows carry src and url; archival rows carry a year range.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

/// One live scrape target. `list` tags a named module within the site
/// ("mostread", "politics") and becomes part of the rule lookup key.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveSource {
    pub src: String,
    pub url: String,
    #[serde(default)]
    pub list: String,
    /// Per-row top-N cap, overriding the command line.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Per-row rendering choice, overriding the command line.
    #[serde(default)]
    pub render: Option<bool>,
}

impl LiveSource {
    /// Key the extraction rule table is consulted with: `src` alone, or
    /// `src_list` when the row names a module.
    pub fn rule_key(&self) -> String {
        if self.list.is_empty() {
            self.src.clone()
        } else {
            format!("{}_{}", self.src, self.list)
        }
    }
}

/// One archival harvest target with its `YYYYMMDD` year-range bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSource {
    pub src: String,
    pub ia_url: String,
    pub ia_year_begin: String,
    pub ia_year_end: String,
}

impl ArchiveSource {
    /// The harvest window as dates. Captures on `begin` are kept, captures
    /// on `end` are not.
    pub fn window(&self) -> anyhow::Result<(NaiveDate, NaiveDate)> {
        let begin = parse_day(&self.ia_year_begin)
            .with_context(|| format!("{}: bad ia_year_begin {:?}", self.src, self.ia_year_begin))?;
        let end = parse_day(&self.ia_year_end)
            .with_context(|| format!("{}: bad ia_year_end {:?}", self.src, self.ia_year_end))?;
        Ok((begin, end))
    }
}

fn parse_day(s: &str) -> anyhow::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, "%Y%m%d")?)
}

/// Read a live source list. Rows without a URL are skipped with a log line;
/// a list that cannot be read or parsed at all is a startup error.
pub fn read_live(path: &Path) -> anyhow::Result<Vec<LiveSource>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open source list {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: LiveSource =
            row.with_context(|| format!("malformed row in {}", path.display()))?;
        if row.url.is_empty() {
            warn!("{}: no url, row skipped", row.src);
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Read an archival source list. Rows without an archive URL are skipped.
pub fn read_archive(path: &Path) -> anyhow::Result<Vec<ArchiveSource>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open source list {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: ArchiveSource =
            row.with_context(|| format!("malformed row in {}", path.display()))?;
        if row.ia_url.is_empty() {
            warn!("{}: no ia_url, row skipped", row.src);
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}
