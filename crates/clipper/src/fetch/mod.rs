// ABOUTME: Page fetching seam: the PageFetcher trait, shared fetch configuration,
// ABOUTME: and the empty-body degradation helper the drivers rely on.

//! Fetching pages.
//!
//! Two implementations sit behind [`PageFetcher`]: [`HttpFetcher`] for plain
//! requests and [`RenderFetcher`] for pages that need a JavaScript pass.
//! Both retry transient failures with linear backoff. Drivers that must keep
//! a batch moving go through [`fetch_or_empty`], which turns a final failure
//! into an empty body.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ClipError;
use crate::retry::{RetryPolicy, MAX_ATTEMPTS};

mod http;
mod render;

pub use http::HttpFetcher;
pub use render::RenderFetcher;

/// Browser user agent presented to scraped sites.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 5.1; rv:24.0) Gecko/20100101 Firefox/24.0";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// WebDriver endpoint (chromedriver's standalone default).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// How long the rendering fetcher waits after navigation before pulling the
/// page source, giving scripts time to fill the page in.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

/// Settings shared by both fetcher implementations. The WebDriver fields are
/// ignored by [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub attempts: u32,
    pub webdriver_url: String,
    pub settle: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            attempts: MAX_ATTEMPTS,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            settle: DEFAULT_SETTLE,
        }
    }
}

impl FetchConfig {
    fn retry(&self) -> RetryPolicy {
        RetryPolicy::linear(self.attempts)
    }
}

/// One page in, decoded text out.
///
/// `get` runs the implementation's bounded retry policy; `get_once` is a
/// single attempt for callers running a retry loop of their own.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page once, without retrying.
    async fn get_once(&self, url: &str) -> Result<String, ClipError>;

    /// The retry policy applied by [`PageFetcher::get`].
    fn retry(&self) -> &RetryPolicy;

    /// Fetch a page, retrying transient failures.
    async fn get(&self, url: &str) -> Result<String, ClipError> {
        self.retry().run(url, || self.get_once(url)).await
    }
}

/// Fetch a page, degrading a final failure to an empty body. Downstream an
/// empty body reads as "nothing to extract", so the batch keeps going.
pub async fn fetch_or_empty(fetcher: &dyn PageFetcher, url: &str) -> String {
    match fetcher.get(url).await {
        Ok(body) => body,
        Err(err) => {
            warn!("{}: continuing with empty page: {}", url, err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyFetcher {
        fail_first: u32,
        calls: AtomicU32,
        retry: RetryPolicy,
    }

    impl FlakyFetcher {
        fn new(fail_first: u32, attempts: u32) -> Self {
            Self {
                fail_first,
                calls: AtomicU32::new(0),
                retry: RetryPolicy::new(attempts, |_| Duration::from_millis(1)),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn get_once(&self, url: &str) -> Result<String, ClipError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.fail_first {
                Err(ClipError::fetch(url, "fetch page", None))
            } else {
                Ok(format!("body of {}", url))
            }
        }

        fn retry(&self) -> &RetryPolicy {
            &self.retry
        }
    }

    #[tokio::test]
    async fn get_retries_through_transient_failures() {
        let fetcher = FlakyFetcher::new(2, 5);
        let body = fetcher.get("http://example.com/a").await.unwrap();
        assert_eq!(body, "body of http://example.com/a");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn get_gives_up_after_the_attempt_budget() {
        let fetcher = FlakyFetcher::new(10, 3);
        let err = fetcher.get("http://example.com/a").await.unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fetch_or_empty_degrades_to_empty_body() {
        let fetcher = FlakyFetcher::new(10, 2);
        let body = fetch_or_empty(&fetcher, "http://example.com/a").await;
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn fetch_or_empty_passes_successful_bodies_through() {
        let fetcher = FlakyFetcher::new(0, 2);
        let body = fetch_or_empty(&fetcher, "http://example.com/a").await;
        assert_eq!(body, "body of http://example.com/a");
    }
}
