// ABOUTME: Command-line surface for the newsrack binary.
// ABOUTME: Four drivers: homepage, top10, snapshots, replay, plus shared config.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Batch news scraper and archive replay tool.
#[derive(Parser, Debug)]
#[command(name = "newsrack")]
#[command(about = "Scrape news homepages, rank lists, and archived snapshots", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); missing file means built-in defaults
    #[arg(short = 'c', long = "config", global = true, default_value = "newsrack.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture each live source homepage into a directory
    Homepage(HomepageArgs),
    /// Scrape most-popular modules into a ranked-list report
    Top10(Top10Args),
    /// Harvest archived snapshots of each source over a year range
    Snapshots(SnapshotsArgs),
    /// Rebuild a report from previously stored captures
    Replay(ReplayArgs),
}

impl Command {
    /// Driver name, used for the run log file and the notification subject.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Homepage(_) => "homepage",
            Command::Top10(_) => "top10",
            Command::Snapshots(_) => "snapshots",
            Command::Replay(_) => "replay",
        }
    }
}

#[derive(Args, Debug)]
pub struct HomepageArgs {
    /// Source list CSV (columns: src,url[,list,limit,render])
    pub sources: PathBuf,

    /// Directory captures are stored in
    #[arg(short = 'd', long = "dir", default_value = "homepages")]
    pub dir: PathBuf,

    /// Gzip stored captures
    #[arg(long = "compress")]
    pub compress: bool,

    /// Fetch through the rendering WebDriver client by default
    #[arg(long = "render")]
    pub render: bool,
}

#[derive(Args, Debug)]
pub struct Top10Args {
    /// Source list CSV (columns: src,url[,list,limit,render])
    pub sources: PathBuf,

    /// Report file, appended to
    #[arg(short = 'o', long = "output", default_value = "output.csv")]
    pub output: PathBuf,

    /// Keep at most N records per source (rows may override)
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    pub count: usize,

    /// Write the column header as the first row
    #[arg(long = "with-header")]
    pub with_header: bool,

    /// Download and parse each linked article
    #[arg(long = "with-text")]
    pub with_text: bool,

    /// Skip links whose URL was already written this run
    #[arg(long = "unique")]
    pub unique: bool,

    /// Gzip stored pages and article dumps
    #[arg(long = "compress")]
    pub compress: bool,

    /// Fetch through the rendering WebDriver client by default
    #[arg(long = "render")]
    pub render: bool,
}

#[derive(Args, Debug)]
pub struct SnapshotsArgs {
    /// Source list CSV (columns: src,ia_url,ia_year_begin,ia_year_end)
    pub sources: PathBuf,

    /// Directory snapshots are stored in
    #[arg(short = 'd', long = "dir", default_value = "internet_archive")]
    pub dir: PathBuf,

    /// Count snapshots per year and source instead of downloading
    #[arg(long = "statistics")]
    pub statistics: bool,

    /// Replace snapshot files already on disk
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Gzip stored snapshots
    #[arg(long = "compress")]
    pub compress: bool,

    /// Re-fetch each snapshot through the rendering WebDriver client
    #[arg(long = "render")]
    pub render: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Directory of stored captures to replay
    pub directory: PathBuf,

    /// Report file, truncated
    #[arg(short = 'o', long = "output", default_value = "output-replay.csv")]
    pub output: PathBuf,

    /// Write the column header as the first row
    #[arg(long = "with-header")]
    pub with_header: bool,

    /// Download and parse each linked article
    #[arg(long = "with-text")]
    pub with_text: bool,

    /// Skip links whose URL was already written this run
    #[arg(long = "unique")]
    pub unique: bool,

    /// Tag every record with keywords drawn from its whole capture
    #[arg(long = "homepage-keywords")]
    pub homepage_keywords: bool,

    /// Rule table JSON file (default: the built-in homepage table)
    #[arg(long = "rules")]
    pub rules: Option<PathBuf>,
}
