// ABOUTME: TOML configuration for the newsrack drivers.
// ABOUTME: Web publishing location, SMTP notification settings, fetch overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use newsrack_clipper::fetch::FetchConfig;
use newsrack_wayback::DEFAULT_ARCHIVE_BASE;
use serde::Deserialize;

/// Everything the drivers read from the config file. Every section is
/// optional; a missing file behaves like an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub notification: Option<NotificationConfig>,
    #[serde(default)]
    pub fetch: FetchOverrides,
}

/// Where finished reports get published for download. Both fields empty
/// disables publishing.
#[derive(Debug, Default, Deserialize)]
pub struct WebConfig {
    /// Directory the report is copied into.
    #[serde(default)]
    pub path: String,
    /// URL prefix the copied report is reachable under.
    #[serde(default)]
    pub url: String,
}

/// SMTP settings for the completion email. The whole table missing means
/// notification is off.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Empty user means the server takes unauthenticated mail.
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_pass: String,
    #[serde(default)]
    pub smtp_ssl: bool,
    pub email_from: String,
    /// Comma-separated recipient list.
    pub email_to: String,
}

fn default_smtp_port() -> u16 {
    25
}

/// Per-run overrides of the fetch stack defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FetchOverrides {
    pub user_agent: Option<String>,
    /// Request timeout, seconds.
    pub timeout: Option<u64>,
    /// Retry attempts per page.
    pub attempts: Option<u32>,
    pub webdriver_url: Option<String>,
    /// Render settle delay, milliseconds.
    pub settle: Option<u64>,
    /// Web archive endpoint the snapshots driver talks to.
    pub archive_url: Option<String>,
}

impl Config {
    /// Read the config file. A file that does not exist yields the defaults;
    /// one that exists but cannot be read or parsed is a startup error.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Fetch settings with the `[fetch]` overrides applied.
    pub fn fetch_config(&self) -> FetchConfig {
        let mut fetch = FetchConfig::default();
        if let Some(user_agent) = &self.fetch.user_agent {
            fetch.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.fetch.timeout {
            fetch.timeout = Duration::from_secs(timeout);
        }
        if let Some(attempts) = self.fetch.attempts {
            fetch.attempts = attempts;
        }
        if let Some(webdriver_url) = &self.fetch.webdriver_url {
            fetch.webdriver_url = webdriver_url.clone();
        }
        if let Some(settle) = self.fetch.settle {
            fetch.settle = Duration::from_millis(settle);
        }
        fetch
    }

    /// Archive endpoint for snapshot harvesting.
    pub fn archive_base(&self) -> &str {
        self.fetch
            .archive_url
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.web.path, "");
        assert_eq!(config.web.url, "");
        assert!(config.notification.is_none());
        assert_eq!(config.archive_base(), DEFAULT_ARCHIVE_BASE);
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(30));
    }

    #[test]
    fn full_file_round_trips() {
        let raw = r#"
            [web]
            path = "/var/www/reports"
            url = "http://box.example/reports/"

            [notification]
            smtp_server = "smtp.example.com"
            smtp_port = 465
            smtp_user = "robot"
            smtp_pass = "hunter2"
            smtp_ssl = true
            email_from = "robot@example.com"
            email_to = "a@example.com, b@example.com"

            [fetch]
            timeout = 10
            attempts = 2
            settle = 1500
            archive_url = "http://archive.test"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.web.url, "http://box.example/reports/");
        let notification = config.notification.as_ref().unwrap();
        assert_eq!(notification.smtp_port, 465);
        assert!(notification.smtp_ssl);
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(10));
        assert_eq!(fetch.attempts, 2);
        assert_eq!(fetch.settle, Duration::from_millis(1500));
        assert_eq!(config.archive_base(), "http://archive.test");
    }

    #[test]
    fn notification_defaults_fill_the_optional_keys() {
        let raw = r#"
            [notification]
            smtp_server = "smtp.example.com"
            email_from = "robot@example.com"
            email_to = "a@example.com"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        let notification = config.notification.unwrap();
        assert_eq!(notification.smtp_port, 25);
        assert_eq!(notification.smtp_user, "");
        assert!(!notification.smtp_ssl);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("no-such-newsrack.toml")).unwrap();
        assert!(config.notification.is_none());
    }
}
