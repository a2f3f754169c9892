// ABOUTME: Per-run log setup: a timestamped file under logs/ plus stderr.
// ABOUTME: The file path feeds the completion notification as its attachment.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDateTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name for one driver run.
fn log_file_name(driver: &str, at: &NaiveDateTime) -> String {
    format!("{}-{}.log", driver, at.format("%Y%m%d%H%M%S"))
}

/// Install the run's tracing subscriber and return the log file path.
///
/// Output tees to stderr and to `logs/{driver}-{YYYYMMDDHHMMSS}.log`;
/// `RUST_LOG` narrows the filter, which otherwise admits `info` and up.
pub fn init(driver: &str, at: &NaiveDateTime) -> anyhow::Result<PathBuf> {
    let dir = PathBuf::from("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(log_file_name(driver, at));
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_names_stamp_the_driver_and_start_time() {
        let at = NaiveDate::from_ymd_opt(2012, 3, 5)
            .unwrap()
            .and_hms_opt(12, 34, 56)
            .unwrap();
        assert_eq!(log_file_name("top10", &at), "top10-20120305123456.log");
        assert_eq!(log_file_name("replay", &at), "replay-20120305123456.log");
    }
}
