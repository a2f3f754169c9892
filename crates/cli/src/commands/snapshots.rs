// ABOUTME: Archive harvest driver: walk each source's year range and store snapshots.
// ABOUTME: Statistics mode only counts; otherwise pages land in the capture store.

use std::path::PathBuf;

use chrono::Datelike;
use newsrack_clipper::capture::{self, SaveOutcome};
use newsrack_clipper::fetch::fetch_or_empty;
use newsrack_wayback::SnapshotIndex;
use tracing::{debug, error, info, warn};

use crate::cli::SnapshotsArgs;
use crate::commands::FetcherSet;
use crate::config::Config;
use crate::sources;

/// Body marker of the interstitial the archive serves in place of a page
/// that moved. Rendering one of these is pointless.
const REDIRECT_MARKER: &str = "Redirecting to...";

pub async fn run(args: &SnapshotsArgs, config: &Config) -> anyhow::Result<Option<PathBuf>> {
    let rows = sources::read_archive(&args.sources)?;
    if !args.statistics {
        capture::ensure_dir(&args.dir)?;
    }

    let fetch_config = config.fetch_config();
    let fetchers = FetcherSet::new(&fetch_config, args.render)?;
    let index = SnapshotIndex::new(config.archive_base())?;

    let mut total = 0usize;
    for row in &rows {
        let (begin, end) = match row.window() {
            Ok(window) => window,
            Err(err) => {
                warn!("{:#}", err);
                continue;
            }
        };

        let mut source_total = 0usize;
        let mut year = end.year();
        let first_year = begin.year();
        while year >= first_year {
            info!("Visit yearly snapshots: {}", year);
            let snapshots = match index.lookup(&row.ia_url, year).await {
                Ok(snapshots) => snapshots,
                Err(err) => {
                    warn!("{}: year {}: {}", row.src, year, err);
                    year -= 1;
                    continue;
                }
            };

            if !args.statistics {
                for snapshot in &snapshots {
                    if !snapshot.in_window(begin, end) {
                        continue;
                    }
                    let at = match snapshot.datetime() {
                        Ok(at) => at,
                        Err(err) => {
                            debug!("{}: {}", row.src, err);
                            continue;
                        }
                    };
                    debug!("Today: {}", snapshot.timestamp);

                    let path = args
                        .dir
                        .join(capture::snapshot_name(&row.src, &at, args.compress));
                    if !args.overwrite && path.exists() {
                        info!("Existing, skipped...");
                        continue;
                    }

                    let url = snapshot.url(index.base(), &row.ia_url);
                    let html = fetch_or_empty(fetchers.pick(false), &url).await;
                    let html = if args.render {
                        if html.is_empty() || html.contains(REDIRECT_MARKER) {
                            debug!("{}: nothing to render, skipped", url);
                            continue;
                        }
                        fetch_or_empty(fetchers.pick(true), &url).await
                    } else {
                        html
                    };

                    info!("Saving to file {}", path.display());
                    match capture::save_html(&path, &html, args.overwrite) {
                        Ok(SaveOutcome::Written) => {}
                        Ok(SaveOutcome::Skipped) => info!("Existing, skipped..."),
                        Err(err) => error!("{}: {}", path.display(), err),
                    }
                }
            }

            info!("Year: {}, {} snapshots", year, snapshots.len());
            source_total += snapshots.len();
            year -= 1;
        }

        info!("Source: {}, {} snapshots", row.src, source_total);
        total += source_total;
    }

    info!("Total: {} snapshots", total);
    info!("Done");
    Ok(None)
}
