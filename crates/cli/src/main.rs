// ABOUTME: Entry point for the newsrack binary: log, run the driver, notify.
// ABOUTME: Only startup failures change the exit code; everything later is logged.

mod cli;
mod commands;
mod config;
mod logging;
mod notify;
mod sources;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info, warn};

use crate::cli::{Cli, Command};
use crate::config::{Config, WebConfig};
use crate::notify::Notifier;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let started = Utc::now();

    let log_path = match logging::init(args.command.name(), &started.naive_utc()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(1);
        }
    };
    info!("{:?}", args);

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::from(1);
        }
    };

    let report = match run(&args, &config).await {
        Ok(report) => report,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::from(1);
        }
    };

    send_notification(&args, &config, &started, report.as_deref(), &log_path).await;
    ExitCode::SUCCESS
}

async fn run(args: &Cli, config: &Config) -> anyhow::Result<Option<PathBuf>> {
    match &args.command {
        Command::Homepage(args) => commands::homepage::run(args, config).await,
        Command::Top10(args) => commands::top10::run(args, config).await,
        Command::Snapshots(args) => commands::snapshots::run(args, config).await,
        Command::Replay(args) => commands::replay::run(args, config).await,
    }
}

/// Completion email per the `[notification]` config table. Failures here are
/// logged and swallowed; the run already finished.
async fn send_notification(
    args: &Cli,
    config: &Config,
    started: &DateTime<Utc>,
    report: Option<&Path>,
    log_path: &Path,
) {
    let mut body = String::new();
    if let Some(report) = report {
        if let Some(link) = publish_report(&config.web, report) {
            body.push_str(&format!("Latest CSV output available at {}\n", link));
        }
    }
    body.push_str("Please check out log file for more detail.");

    let Some(notification) = &config.notification else {
        return;
    };
    let subject = format!(
        "newsrack {} ({})",
        args.command.name(),
        started.format("%Y-%m-%d %H:%M:%S")
    );
    let outcome = match Notifier::new(notification) {
        Ok(notifier) => notifier.send(&subject, &body, Some(log_path)).await,
        Err(err) => Err(err),
    };
    if let Err(err) = outcome {
        error!("Cannot send email: {:#}", err);
    }
}

/// Copy the finished report into the web-served directory and hand back the
/// URL it is reachable under. `[web]` left empty disables publishing.
fn publish_report(web: &WebConfig, report: &Path) -> Option<String> {
    if web.url.is_empty() {
        return None;
    }
    let name = report.file_name()?.to_string_lossy().into_owned();
    if !web.path.is_empty() {
        info!("Pushing output to web server... {}", name);
        let dest = Path::new(&web.path).join(&name);
        if let Err(err) = fs::copy(report, &dest) {
            warn!("{}: {}", dest.display(), err);
            return None;
        }
    }
    Some(format!("{}{}", web.url, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn publishing_copies_the_report_and_builds_the_link() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("output.csv");
        let mut file = fs::File::create(&report).unwrap();
        writeln!(file, "\"2012-03-05\",\"12:00:00\"").unwrap();
        let web_dir = dir.path().join("www");
        fs::create_dir(&web_dir).unwrap();

        let web = WebConfig {
            path: web_dir.display().to_string(),
            url: "http://box.example/reports/".to_string(),
        };
        let link = publish_report(&web, &report).unwrap();
        assert_eq!(link, "http://box.example/reports/output.csv");
        assert!(web_dir.join("output.csv").exists());
    }

    #[test]
    fn no_web_url_means_no_link() {
        let web = WebConfig::default();
        assert_eq!(publish_report(&web, Path::new("output.csv")), None);
    }

    #[test]
    fn unwritable_web_path_drops_the_link() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("output.csv");
        fs::File::create(&report).unwrap();
        let web = WebConfig {
            path: dir.path().join("missing").display().to_string(),
            url: "http://box.example/".to_string(),
        };
        assert_eq!(publish_report(&web, &report), None);
    }
}
