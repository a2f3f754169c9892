// ABOUTME: Bounded retry with pluggable backoff, shared by both fetchers and enrichment.
// ABOUTME: Default policy is 5 attempts with linear backoff (attempt N sleeps N seconds).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default number of attempts before an operation is given up on.
pub const MAX_ATTEMPTS: u32 = 5;

/// A bounded retry policy: how many attempts, and how long to sleep after
/// the Nth failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: fn(u32) -> Duration,
}

fn linear_backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt))
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: fn(u32) -> Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Linear backoff: sleep 1s after the first failure, 2s after the
    /// second, and so on.
    pub fn linear(attempts: u32) -> Self {
        Self::new(attempts, linear_backoff)
    }

    /// Run `op` until it succeeds or the attempt budget is spent, sleeping
    /// between attempts. The final error is returned as-is.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.attempts {
                        warn!("{}: giving up after {} attempts: {}", what, attempt, err);
                        return Err(err);
                    }
                    let delay = (self.backoff)(attempt);
                    warn!(
                        "{}: attempt {} failed ({}), retry in {:?}",
                        what, attempt, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(MAX_ATTEMPTS)
    }
}
