// ABOUTME: Capture file naming, gzip-aware reading and writing, and directory scans.
// ABOUTME: File names carry the source and a UTC timestamp; order-suffixed names hold article dumps.

//! Capture storage.
//!
//! A capture is one page snapshot on disk. Live homepage runs write
//! `{source}_{YYYYMMDD_HHMMSS}.html`, archival runs write
//! `{source}_ia_{14 digits}.html`, and enrichment writes order-suffixed
//! article dumps under a per-source subdirectory. Either kind may carry a
//! `.gz` suffix, and [`read_html_or_empty`] hands a damaged file back as an
//! empty page so one bad capture cannot sink a batch.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ClipError;
use crate::timestamp::{format_timestamp, parse_timestamp};

/// Timestamp digits without the middle underscore, as used by archival and
/// article dump names.
const COMPACT_TS_FORMAT: &str = "%Y%m%d%H%M%S";

/// Accepts both `_YYYYMMDD_HHMMSS` and `_YYYYMMDDHHMMSS` before the suffix.
static CAPTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)_(\d{8})_?(\d{6})\.html(\.gz)?$").expect("static pattern"));

/// A capture file name taken apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureName {
    pub source: String,
    pub timestamp: NaiveDateTime,
    pub gzipped: bool,
}

impl CaptureName {
    /// Parse a capture file name. A trailing `_ia` marker folds away, so
    /// `fox_politics_ia_...` and `fox_politics_...` both name the
    /// `fox_politics` source.
    pub fn parse(file_name: &str) -> Option<CaptureName> {
        let caps = CAPTURE_RE.captures(file_name)?;
        let source = caps[1].strip_suffix("_ia").unwrap_or(&caps[1]).to_string();
        if source.is_empty() {
            return None;
        }
        let ts = parse_timestamp(&format!("{}_{}", &caps[2], &caps[3])).ok()?;
        Some(CaptureName {
            source,
            timestamp: ts,
            gzipped: caps.get(4).is_some(),
        })
    }
}

fn with_gz(name: String, gzipped: bool) -> String {
    if gzipped {
        name + ".gz"
    } else {
        name
    }
}

/// File name for a live homepage capture.
pub fn page_name(source: &str, ts: &NaiveDateTime, gzipped: bool) -> String {
    with_gz(format!("{}_{}.html", source, format_timestamp(ts)), gzipped)
}

/// File name for a homepage snapshot replayed out of the archive.
pub fn snapshot_name(source: &str, ts: &NaiveDateTime, gzipped: bool) -> String {
    with_gz(
        format!("{}_ia_{}.html", source, ts.format(COMPACT_TS_FORMAT)),
        gzipped,
    )
}

/// File name for one article dump. The order suffix keeps dumps from the
/// same batch apart; scans do not pick these up.
pub fn article_name(source: &str, ts: &NaiveDateTime, order: u32, gzipped: bool) -> String {
    with_gz(
        format!("{}_{}_{}.html", source, ts.format(COMPACT_TS_FORMAT), order),
        gzipped,
    )
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<(), ClipError> {
    fs::create_dir_all(dir).map_err(|err| {
        ClipError::store(
            dir.display().to_string(),
            "create capture directory",
            Some(err.into()),
        )
    })
}

/// Write page markup to `path`, gzip-compressing when the name ends in `.gz`.
pub fn write_html(path: &Path, html: &str) -> Result<(), ClipError> {
    let io = if is_gzip_path(path) {
        write_gzipped(path, html)
    } else {
        fs::write(path, html)
    };
    io.map_err(|err| {
        ClipError::store(path.display().to_string(), "write capture", Some(err.into()))
    })
}

/// Outcome of a conditional save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    Skipped,
}

/// Write a capture unless one is already on disk. With `overwrite` the
/// existing file is replaced; without, the save reports
/// [`SaveOutcome::Skipped`] and leaves it alone.
pub fn save_html(path: &Path, html: &str, overwrite: bool) -> Result<SaveOutcome, ClipError> {
    if !overwrite && path.exists() {
        return Ok(SaveOutcome::Skipped);
    }
    write_html(path, html)?;
    Ok(SaveOutcome::Written)
}

/// Read a capture back, gunzipping when the name ends in `.gz`.
pub fn read_html(path: &Path) -> Result<String, ClipError> {
    let io = if is_gzip_path(path) {
        read_gzipped(path)
    } else {
        fs::read_to_string(path)
    };
    io.map_err(|err| {
        ClipError::store(path.display().to_string(), "read capture", Some(err.into()))
    })
}

/// Read a capture, degrading an unreadable or corrupt file to an empty page.
/// Downstream an empty page extracts nothing, so the batch keeps going.
pub fn read_html_or_empty(path: &Path) -> String {
    match read_html(path) {
        Ok(html) => html,
        Err(err) => {
            warn!("{}: unreadable capture: {}", path.display(), err);
            String::new()
        }
    }
}

/// Every parseable capture directly under `dir`, sorted by file name.
/// Files with names that do not look like captures are skipped.
pub fn scan(dir: &Path) -> Result<Vec<(PathBuf, CaptureName)>, ClipError> {
    let entries = fs::read_dir(dir).map_err(|err| {
        ClipError::store(dir.display().to_string(), "scan captures", Some(err.into()))
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            ClipError::store(dir.display().to_string(), "scan captures", Some(err.into()))
        })?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut captures = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match CaptureName::parse(name) {
            Some(parsed) => captures.push((path, parsed)),
            None => debug!("{}: not a capture file name, skipped", path.display()),
        }
    }
    Ok(captures)
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn write_gzipped(path: &Path, html: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(html.as_bytes())?;
    encoder.finish()?;
    Ok(())
}

fn read_gzipped(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut html = String::new();
    GzDecoder::new(file).read_to_string(&mut html)?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;
    use pretty_assertions::assert_eq;

    fn ts() -> NaiveDateTime {
        parse_timestamp("20120305_120000").unwrap()
    }

    #[test]
    fn page_names_round_trip() {
        let name = page_name("nytimes", &ts(), false);
        assert_eq!(name, "nytimes_20120305_120000.html");

        let parsed = CaptureName::parse(&name).unwrap();
        assert_eq!(parsed.source, "nytimes");
        assert_eq!(parsed.timestamp, ts());
        assert!(!parsed.gzipped);
    }

    #[test]
    fn gzipped_names_round_trip() {
        let name = page_name("bbc", &ts(), true);
        assert_eq!(name, "bbc_20120305_120000.html.gz");
        assert!(CaptureName::parse(&name).unwrap().gzipped);
    }

    #[test]
    fn archival_marker_folds_into_the_source() {
        let name = snapshot_name("guardian", &ts(), true);
        assert_eq!(name, "guardian_ia_20120305120000.html.gz");

        let parsed = CaptureName::parse(&name).unwrap();
        assert_eq!(parsed.source, "guardian");
        assert_eq!(parsed.timestamp, ts());
    }

    #[test]
    fn multi_word_sources_survive_parsing() {
        let archived = CaptureName::parse("fox_politics_ia_20120305120000.html.gz").unwrap();
        assert_eq!(archived.source, "fox_politics");

        let live = CaptureName::parse("fox_politics_20120305_120000.html").unwrap();
        assert_eq!(live.source, "fox_politics");
    }

    #[test]
    fn article_dumps_are_not_captures() {
        let name = article_name("nytimes", &ts(), 4, true);
        assert_eq!(name, "nytimes_20120305120000_4.html.gz");
        assert!(CaptureName::parse(&name).is_none());
    }

    #[test]
    fn junk_names_are_rejected() {
        assert!(CaptureName::parse("notes.txt").is_none());
        assert!(CaptureName::parse("nytimes_2012_12.html").is_none());
        assert!(CaptureName::parse("_20120305_120000.html").is_none());
        assert!(CaptureName::parse("nytimes_20121305_120000.html").is_none());
    }

    #[test]
    fn plain_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20120305_120000.html");
        write_html(&path, "<html>hi</html>").unwrap();
        assert_eq!(read_html(&path).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn gzipped_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20120305_120000.html.gz");
        write_html(&path, "<html>compressed</html>").unwrap();

        // On-disk bytes must actually be a gzip stream.
        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(read_html(&path).unwrap(), "<html>compressed</html>");
    }

    #[test]
    fn save_refuses_to_clobber_unless_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20120305_120000.html");

        assert_eq!(save_html(&path, "first", false).unwrap(), SaveOutcome::Written);
        assert_eq!(save_html(&path, "second", false).unwrap(), SaveOutcome::Skipped);
        assert_eq!(read_html(&path).unwrap(), "first");

        assert_eq!(save_html(&path, "second", true).unwrap(), SaveOutcome::Written);
        assert_eq!(read_html(&path).unwrap(), "second");
    }

    #[test]
    fn corrupt_gzip_degrades_to_an_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_20120305_120000.html.gz");
        fs::write(&path, b"this is not a gzip stream").unwrap();
        assert_eq!(read_html_or_empty(&path), "");
    }

    #[test]
    fn missing_file_degrades_to_an_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_html_or_empty(&dir.path().join("absent.html")), "");
    }

    #[test]
    fn scan_sorts_and_skips_junk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zdf_20120306_080000.html"), "b").unwrap();
        fs::write(dir.path().join("bbc_20120305_120000.html"), "a").unwrap();
        fs::write(dir.path().join("README.md"), "junk").unwrap();
        fs::create_dir(dir.path().join("bbc")).unwrap();

        let captures = scan(dir.path()).unwrap();
        let names: Vec<&str> = captures.iter().map(|(_, c)| c.source.as_str()).collect();
        assert_eq!(names, vec!["bbc", "zdf"]);
    }

    #[test]
    fn ensure_dir_creates_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("news").join("bbc");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
