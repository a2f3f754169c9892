// ABOUTME: Ranked-list driver: scrape each source's most-popular module live.
// ABOUTME: Appends records to the report; module pages land under html/.

use std::path::{Path, PathBuf};

use chrono::Utc;
use newsrack_clipper::article::ArticleExtractor;
use newsrack_clipper::capture;
use newsrack_clipper::fetch::fetch_or_empty;
use newsrack_clipper::links;
use newsrack_clipper::records::{self, BuildOptions, DedupSet, DumpOptions};
use newsrack_clipper::report::{OpenMode, ReportKind, ReportOptions, ReportWriter};
use newsrack_clipper::rules::loader::load_top10_table;
use tracing::{info, warn};

use crate::cli::Top10Args;
use crate::commands::{site_origin, FetcherSet};
use crate::config::Config;
use crate::sources;

/// Where raw module pages are kept.
const PAGES_DIR: &str = "html";

/// Where enriched article dumps are kept.
const ARTICLES_DIR: &str = "news";

pub async fn run(args: &Top10Args, config: &Config) -> anyhow::Result<Option<PathBuf>> {
    let rows = sources::read_live(&args.sources)?;
    let table = load_top10_table();
    capture::ensure_dir(Path::new(PAGES_DIR))?;
    capture::ensure_dir(Path::new(ARTICLES_DIR))?;

    let options = ReportOptions {
        kind: ReportKind::RankedList,
        mode: OpenMode::Append,
        with_header: args.with_header,
    };
    let mut report = ReportWriter::open(&args.output, &options)?;

    let fetch_config = config.fetch_config();
    let want_render = args.render || rows.iter().any(|row| row.render == Some(true));
    let fetchers = FetcherSet::new(&fetch_config, want_render)?;
    let extractor = args
        .with_text
        .then(|| ArticleExtractor::new(&fetch_config))
        .transpose()?;
    let dump = DumpOptions {
        dir: PathBuf::from(ARTICLES_DIR),
        gzip: args.compress,
    };
    let mut dedup = args.unique.then(DedupSet::new);

    for row in &rows {
        let key = row.rule_key();
        let at = Utc::now().naive_utc();
        let rule = match table.resolve(&key, at) {
            Ok(rule) => rule,
            Err(err) => {
                warn!("{}: {}", key, err);
                continue;
            }
        };
        // Relative hrefs belong to the site the page came from, not to the
        // replay base the built-in table carries.
        let mut rule = rule.clone();
        if let Some(origin) = site_origin(&row.url) {
            rule.base = origin;
        }
        let compiled = match rule.compile() {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!("{}: {}", key, err);
                continue;
            }
        };

        info!("Scraping {}...", key);
        let fetcher = fetchers.pick(row.render.unwrap_or(args.render));
        let html = fetch_or_empty(fetcher, &row.url).await;

        let page = Path::new(PAGES_DIR).join(capture::page_name(&key, &at, args.compress));
        if let Err(err) = capture::write_html(&page, &html) {
            warn!("{}: {}", page.display(), err);
        }

        let candidates = links::extract_html(&html, &compiled);
        let build_options = BuildOptions {
            src_list: row.list.clone(),
            limit: row.limit.unwrap_or(args.count),
            homepage_keywords: String::new(),
        };
        let mut batch = records::build(&candidates, &row.src, &at, &build_options, dedup.as_mut());
        if let Some(extractor) = &extractor {
            records::enrich_all(&mut batch, extractor, &dump).await;
        }
        info!("{}: {} records", key, batch.len());
        report.write_all(&batch)?;
    }

    report.flush()?;
    info!("Done");
    Ok(Some(args.output.clone()))
}
