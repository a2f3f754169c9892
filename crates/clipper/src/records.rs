// ABOUTME: Record building: stamping candidate links into ordered rows, URL de-duplication,
// ABOUTME: and article enrichment with on-disk dumps of what was downloaded.

//! From links to rows.
//!
//! [`build`] turns a batch of candidate links into [`Record`]s: stamped with
//! the batch timestamp, numbered from one, optionally de-duplicated against
//! a [`DedupSet`] and cut off at a limit. Dropped duplicates never consume
//! an order number. [`enrich`] then fills the article columns in, writing a
//! dump of the downloaded page next to the captures.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::article::{self, nlp, ArticleExtractor};
use crate::capture;
use crate::links::CandidateLink;
use crate::normalize::clean_text;

/// Date column format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time column format.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Article columns, filled by [`enrich`]. Everything stays an empty string
/// until an article download succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub path: String,
    pub title: String,
    pub text: String,
    pub top_image: String,
    /// Pipe-joined author names.
    pub authors: String,
    pub summary: String,
    /// Pipe-joined keywords.
    pub keywords: String,
}

/// One extracted link, stamped and numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Batch timestamp; the date and time columns are views of it.
    pub at: NaiveDateTime,
    pub src: String,
    /// Rule list tag, only meaningful for ranked-list scrapes.
    pub src_list: String,
    pub url: String,
    /// 1-based position within the batch.
    pub order: u32,
    pub link_text: String,
    /// Page-level keywords shared by every record of a replayed capture.
    pub homepage_keywords: String,
    pub enrichment: Enrichment,
}

impl Record {
    pub fn date(&self) -> String {
        self.at.format(DATE_FORMAT).to_string()
    }

    pub fn time(&self) -> String {
        self.at.format(TIME_FORMAT).to_string()
    }
}

/// URLs already written during a run. Shared across batches so a replayed
/// story is only kept the first time it shows up.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a URL, returning true when it was new.
    pub fn insert(&mut self, url: &str) -> bool {
        self.seen.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Settings for stamping one batch of links.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Written to the `src_list` column.
    pub src_list: String,
    /// Keep at most this many records; zero means no limit.
    pub limit: usize,
    /// Stamped on every record of the batch.
    pub homepage_keywords: String,
}

/// Stamp candidate links into records. Order numbers are handed out after
/// dropping duplicates, so the column stays dense.
pub fn build(
    candidates: &[CandidateLink],
    src: &str,
    at: &NaiveDateTime,
    options: &BuildOptions,
    mut dedup: Option<&mut DedupSet>,
) -> Vec<Record> {
    let mut records = Vec::new();
    for candidate in candidates {
        if options.limit > 0 && records.len() >= options.limit {
            break;
        }
        if let Some(seen) = &mut dedup {
            if !seen.insert(&candidate.url) {
                debug!("{}: duplicate link skipped", candidate.url);
                continue;
            }
        }
        records.push(Record {
            at: *at,
            src: src.to_string(),
            src_list: options.src_list.clone(),
            url: candidate.url.clone(),
            order: records.len() as u32 + 1,
            link_text: clean_text(&candidate.text),
            homepage_keywords: options.homepage_keywords.clone(),
            enrichment: Enrichment::default(),
        });
    }
    records
}

/// Where article dumps land and whether they are compressed.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Dumps go into a per-source subdirectory of this.
    pub dir: PathBuf,
    pub gzip: bool,
}

/// Download the record's article and fill the enrichment columns in.
///
/// The dump is written only once the download has parsed, so the directory
/// never holds interstitial shells. A dump that cannot be written is logged
/// and leaves the `path` column empty; the text columns are kept either
/// way. Returns false when every URL variant failed.
pub async fn enrich(
    record: &mut Record,
    extractor: &ArticleExtractor,
    dump: &DumpOptions,
) -> bool {
    let fetched = match extractor.fetch_with_repair(&record.url).await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!("{}: enrichment failed: {}", record.url, err);
            return false;
        }
    };
    // The row should point at the variant that actually answered.
    record.url = fetched.url;

    let subdir = dump.dir.join(&record.src);
    let name = capture::article_name(&record.src, &record.at, record.order, dump.gzip);
    let path = subdir.join(name);
    match capture::ensure_dir(&subdir).and_then(|()| capture::write_html(&path, &fetched.html)) {
        Ok(()) => record.enrichment.path = path.display().to_string(),
        Err(err) => warn!("{}: article dump not written: {}", path.display(), err),
    }

    let article = fetched.article;
    let enrichment = &mut record.enrichment;
    enrichment.title = clean_text(&article.title);
    enrichment.text = clean_text(&article.text);
    enrichment.top_image = article.top_image;
    enrichment.authors = article.authors.join("|");
    enrichment.keywords = nlp::keywords(&article.title, &article.text).join("|");
    enrichment.summary = clean_text(&nlp::summary(&article.title, &article.text));
    true
}

/// [`enrich`] every record in the batch, returning how many succeeded.
pub async fn enrich_all(
    records: &mut [Record],
    extractor: &ArticleExtractor,
    dump: &DumpOptions,
) -> usize {
    let mut enriched = 0;
    for record in records.iter_mut() {
        if enrich(record, extractor, dump).await {
            enriched += 1;
        }
    }
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::timestamp::parse_timestamp;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn at() -> NaiveDateTime {
        parse_timestamp("20120305_120000").unwrap()
    }

    fn link(text: &str, url: &str) -> CandidateLink {
        CandidateLink {
            text: text.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn records_are_numbered_from_one() {
        let candidates = vec![link("A", "http://x/a"), link("B", "http://x/b")];
        let records = build(&candidates, "bbc", &at(), &BuildOptions::default(), None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].order, 1);
        assert_eq!(records[1].order, 2);
        assert_eq!(records[0].date(), "2012-03-05");
        assert_eq!(records[0].time(), "12:00:00");
        assert_eq!(records[0].src, "bbc");
    }

    #[test]
    fn link_text_is_cleaned() {
        let candidates = vec![link("Itâ€™s\nofficial!", "http://x/a")];
        let records = build(&candidates, "bbc", &at(), &BuildOptions::default(), None);
        assert_eq!(records[0].link_text, "It’s official");
    }

    #[test]
    fn limit_cuts_the_batch() {
        let candidates: Vec<CandidateLink> = (0..5)
            .map(|i| link("t", &format!("http://x/{}", i)))
            .collect();
        let options = BuildOptions {
            limit: 3,
            ..BuildOptions::default()
        };
        let records = build(&candidates, "bbc", &at(), &options, None);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].order, 3);
    }

    #[test]
    fn zero_limit_keeps_everything() {
        let candidates: Vec<CandidateLink> = (0..15)
            .map(|i| link("t", &format!("http://x/{}", i)))
            .collect();
        let records = build(&candidates, "bbc", &at(), &BuildOptions::default(), None);
        assert_eq!(records.len(), 15);
    }

    #[test]
    fn duplicates_are_dropped_before_numbering() {
        let candidates = vec![
            link("A", "http://x/a"),
            link("B", "http://x/b"),
            link("A again", "http://x/a"),
            link("C", "http://x/c"),
        ];
        let mut dedup = DedupSet::new();
        let records = build(
            &candidates,
            "bbc",
            &at(),
            &BuildOptions::default(),
            Some(&mut dedup),
        );
        let orders: Vec<(u32, &str)> = records
            .iter()
            .map(|r| (r.order, r.url.as_str()))
            .collect();
        assert_eq!(
            orders,
            vec![(1, "http://x/a"), (2, "http://x/b"), (3, "http://x/c")]
        );
    }

    #[test]
    fn dedup_carries_across_batches() {
        let mut dedup = DedupSet::new();
        let first = build(
            &[link("A", "http://x/a")],
            "bbc",
            &at(),
            &BuildOptions::default(),
            Some(&mut dedup),
        );
        assert_eq!(first.len(), 1);

        let second = build(
            &[link("A", "http://x/a"), link("B", "http://x/b")],
            "bbc",
            &at(),
            &BuildOptions::default(),
            Some(&mut dedup),
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].url, "http://x/b");
        // Numbering restarts per batch.
        assert_eq!(second[0].order, 1);
    }

    #[test]
    fn src_list_and_keywords_are_stamped() {
        let options = BuildOptions {
            src_list: "front-page".to_string(),
            homepage_keywords: "politics|budget".to_string(),
            ..BuildOptions::default()
        };
        let records = build(&[link("A", "http://x/a")], "bbc", &at(), &options, None);
        assert_eq!(records[0].src_list, "front-page");
        assert_eq!(records[0].homepage_keywords, "politics|budget");
    }

    const ARTICLE: &str = r#"
        <html>
          <head>
            <meta property="og:title" content="Vote Result">
            <meta property="og:image" content="http://cdn/img.jpg">
            <meta name="author" content="Jane Doe">
          </head>
          <body>
            <div>
              <p>The measure, backed by both parties, cleared the chamber on a
                 63 to 35 vote, capping weeks of negotiation.</p>
              <p>Opponents, led by a bloc of backbenchers, promised a fight
                 over the supplemental requests, due back in the fall.</p>
            </div>
          </body>
        </html>
    "#;

    fn record_for(url: &str) -> Record {
        build(
            &[link("Vote result", url)],
            "bbc",
            &at(),
            &BuildOptions::default(),
            None,
        )
        .remove(0)
    }

    fn extractor() -> ArticleExtractor {
        let config = FetchConfig {
            attempts: 1,
            ..FetchConfig::default()
        };
        ArticleExtractor::new(&config).unwrap()
    }

    #[tokio::test]
    async fn enrich_fills_the_article_columns() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(ARTICLE);
        });
        let dir = tempfile::tempdir().unwrap();
        let dump = DumpOptions {
            dir: dir.path().to_path_buf(),
            gzip: true,
        };

        let mut record = record_for(&server.url("/story"));
        let ok = enrich(&mut record, &extractor(), &dump).await;

        assert!(ok);
        assert_eq!(record.enrichment.title, "Vote Result");
        assert_eq!(record.enrichment.top_image, "http://cdn/img.jpg");
        assert_eq!(record.enrichment.authors, "Jane Doe");
        assert!(record.enrichment.text.starts_with("The measure"));
        assert!(!record.enrichment.keywords.is_empty());
        assert!(record.enrichment.path.ends_with("bbc_20120305120000_1.html.gz"));

        let on_disk = std::path::Path::new(&record.enrichment.path);
        assert!(on_disk.is_file());
        assert!(capture::read_html(on_disk).unwrap().contains("og:title"));
    }

    #[tokio::test]
    async fn failed_enrichment_leaves_the_columns_empty() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });
        let dir = tempfile::tempdir().unwrap();
        let dump = DumpOptions {
            dir: dir.path().to_path_buf(),
            gzip: false,
        };

        let mut record = record_for(&server.url("/gone"));
        let ok = enrich(&mut record, &extractor(), &dump).await;

        assert!(!ok);
        assert_eq!(record.enrichment, Enrichment::default());
    }

    #[tokio::test]
    async fn enrich_all_counts_successes() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/good");
            then.status(200).body(ARTICLE);
        });
        server.mock(|when, then| {
            when.method(GET).path("/bad");
            then.status(404);
        });
        let dir = tempfile::tempdir().unwrap();
        let dump = DumpOptions {
            dir: dir.path().to_path_buf(),
            gzip: false,
        };

        let mut records = build(
            &[
                link("good", &server.url("/good")),
                link("bad", &server.url("/bad")),
            ],
            "bbc",
            &at(),
            &BuildOptions::default(),
            None,
        );
        let enriched = enrich_all(&mut records, &extractor(), &dump).await;

        assert_eq!(enriched, 1);
        assert!(!records[0].enrichment.title.is_empty());
        assert!(records[1].enrichment.title.is_empty());
    }
}
