// ABOUTME: Live homepage capture driver: fetch each source row, store the body.
// ABOUTME: No extraction happens here; captures feed the replay driver later.

use std::path::PathBuf;

use chrono::Utc;
use newsrack_clipper::capture;
use newsrack_clipper::fetch::fetch_or_empty;
use tracing::{error, info};

use crate::cli::HomepageArgs;
use crate::commands::FetcherSet;
use crate::config::Config;
use crate::sources;

pub async fn run(args: &HomepageArgs, config: &Config) -> anyhow::Result<Option<PathBuf>> {
    let rows = sources::read_live(&args.sources)?;
    capture::ensure_dir(&args.dir)?;

    let fetch_config = config.fetch_config();
    let want_render = args.render || rows.iter().any(|row| row.render == Some(true));
    let fetchers = FetcherSet::new(&fetch_config, want_render)?;

    for row in &rows {
        info!("Capturing {}...", row.src);
        let fetcher = fetchers.pick(row.render.unwrap_or(args.render));
        let html = fetch_or_empty(fetcher, &row.url).await;
        let at = Utc::now().naive_utc();
        let path = args.dir.join(capture::page_name(&row.src, &at, args.compress));
        match capture::write_html(&path, &html) {
            Ok(()) => info!("Saving to file {}", path.display()),
            Err(err) => error!("{}: {}", path.display(), err),
        }
    }

    info!("Done");
    Ok(None)
}
