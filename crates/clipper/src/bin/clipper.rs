// ABOUTME: Debug binary: fetch one page, resolve its extraction rule, print candidates.
// ABOUTME: Useful for checking a rule against a live page before a batch run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use newsrack_clipper::fetch::{FetchConfig, HttpFetcher, PageFetcher, RenderFetcher};
use newsrack_clipper::links;
use newsrack_clipper::rules::loader::{load_homepage_table, load_table_from_path};
use newsrack_clipper::timestamp::parse_timestamp;

#[derive(Parser, Debug)]
#[command(name = "clipper")]
#[command(about = "Extract candidate links from one page")]
struct Args {
    /// Page URL to fetch
    url: String,

    /// Source identifier to resolve the extraction rule for
    #[arg(short = 's', long = "source")]
    source: String,

    /// Resolve the rule as of this timestamp, YYYYMMDD_HHMMSS (default: now)
    #[arg(long = "at")]
    at: Option<String>,

    /// Fetch through the rendering WebDriver client
    #[arg(long = "render")]
    render: bool,

    /// Rule table JSON file (default: the built-in homepage table)
    #[arg(long = "rules")]
    rules: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let at = match &args.at {
        Some(ts) => parse_timestamp(ts)?,
        None => chrono::Utc::now().naive_utc(),
    };
    let table = match &args.rules {
        Some(path) => load_table_from_path(path)?,
        None => load_homepage_table(),
    };
    let rule = table.resolve(&args.source, at)?.compile()?;

    let config = FetchConfig::default();
    let html = if args.render {
        RenderFetcher::new(&config)?.get(&args.url).await?
    } else {
        HttpFetcher::new(&config)?.get(&args.url).await?
    };

    let candidates = links::extract_html(&html, &rule);
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(())
}
