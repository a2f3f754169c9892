// ABOUTME: Replay driver: rebuild a report from captures already on disk.
// ABOUTME: Resolves each capture against the rule epoch it was scraped under.

use std::path::PathBuf;

use newsrack_clipper::article::{self, nlp, ArticleExtractor};
use newsrack_clipper::capture;
use newsrack_clipper::links;
use newsrack_clipper::records::{self, BuildOptions, DedupSet, DumpOptions};
use newsrack_clipper::report::{OpenMode, ReportKind, ReportOptions, ReportWriter};
use newsrack_clipper::rules::loader::{load_homepage_table, load_table_from_path};
use tracing::{info, warn};

use crate::cli::ReplayArgs;
use crate::config::Config;

/// Where enriched article dumps land, kept apart from the live drivers'.
const ARTICLES_DIR: &str = "news-replay";

pub async fn run(args: &ReplayArgs, config: &Config) -> anyhow::Result<Option<PathBuf>> {
    let captures = capture::scan(&args.directory)?;
    let table = match &args.rules {
        Some(path) => load_table_from_path(path)?,
        None => load_homepage_table(),
    };

    let kind = if args.homepage_keywords {
        ReportKind::ReplayHomepage
    } else {
        ReportKind::ReplayRanked
    };
    let options = ReportOptions {
        kind,
        mode: OpenMode::Truncate,
        with_header: args.with_header,
    };
    let mut report = ReportWriter::open(&args.output, &options)?;

    let fetch_config = config.fetch_config();
    let extractor = args
        .with_text
        .then(|| ArticleExtractor::new(&fetch_config))
        .transpose()?;
    let dump = DumpOptions {
        dir: PathBuf::from(ARTICLES_DIR),
        gzip: true,
    };
    let mut dedup = args.unique.then(DedupSet::new);

    for (n, (path, name)) in captures.iter().enumerate() {
        info!("#{} Processing: {}", n + 1, path.display());
        let rule = match table.resolve(&name.source, name.timestamp) {
            Ok(rule) => rule,
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                continue;
            }
        };
        let compiled = match rule.compile() {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!("{}: {}", name.source, err);
                continue;
            }
        };

        let html = capture::read_html_or_empty(path);
        let candidates = links::extract_html(&html, &compiled);
        let homepage_keywords = if args.homepage_keywords {
            page_keywords(&html)
        } else {
            String::new()
        };

        let build_options = BuildOptions {
            src_list: String::new(),
            limit: 0,
            homepage_keywords,
        };
        let mut batch = records::build(
            &candidates,
            &name.source,
            &name.timestamp,
            &build_options,
            dedup.as_mut(),
        );
        if let Some(extractor) = &extractor {
            records::enrich_all(&mut batch, extractor, &dump).await;
        }
        report.write_all(&batch)?;
    }

    report.flush()?;
    info!("Done");
    Ok(Some(args.output.clone()))
}

/// Keywords for a whole capture, shared by every record built from it.
fn page_keywords(html: &str) -> String {
    let parsed = article::parse(html);
    nlp::keywords(&parsed.title, &parsed.text).join("|")
}
