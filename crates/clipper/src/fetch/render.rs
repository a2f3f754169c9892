// ABOUTME: JavaScript-rendering fetcher driving a WebDriver endpoint over the
// ABOUTME: JSON wire protocol: create session, navigate, settle, pull source, delete.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ClipError;
use crate::retry::RetryPolicy;

use super::{FetchConfig, PageFetcher};

/// Renders pages through a WebDriver-compatible endpoint (chromedriver,
/// geckodriver, a Selenium server). Every fetch runs in a fresh session so a
/// wedged page never poisons the next one; a dead endpoint surfaces as a
/// render failure, retried like any other fetch.
pub struct RenderFetcher {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    settle: Duration,
    retry: RetryPolicy,
}

impl RenderFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ClipError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClipError::render("", "build webdriver client", Some(e.into())))?;
        Ok(Self {
            client,
            endpoint: config.webdriver_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            settle: config.settle,
            retry: config.retry(),
        })
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless",
                            "--disable-gpu",
                            "--no-sandbox",
                            "--disable-dev-shm-usage",
                            format!("--user-agent={}", self.user_agent),
                        ]
                    }
                }
            }
        })
    }

    /// A WebDriver error object in a response body, if present.
    fn wire_error(body: &Value) -> Option<String> {
        let name = body.pointer("/value/error")?.as_str()?;
        let message = body
            .pointer("/value/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown webdriver error");
        Some(format!("{}: {}", name, message))
    }

    async fn wire_post(
        &self,
        url: &str,
        op: &str,
        wire: String,
        payload: Value,
    ) -> Result<Value, ClipError> {
        let response = self
            .client
            .post(&wire)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClipError::render(url, op, Some(e.into())))?;
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            ClipError::render(url, op, Some(anyhow::anyhow!("bad wire response: {}", e)))
        })?;
        if let Some(err) = Self::wire_error(&body) {
            return Err(ClipError::render(url, op, Some(anyhow::anyhow!(err))));
        }
        if !status.is_success() {
            return Err(ClipError::render(
                url,
                op,
                Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
            ));
        }
        Ok(body)
    }

    async fn create_session(&self, url: &str) -> Result<String, ClipError> {
        let body = self
            .wire_post(
                url,
                "create session",
                format!("{}/session", self.endpoint),
                self.capabilities(),
            )
            .await?;
        body.pointer("/value/sessionId")
            .and_then(Value::as_str)
            .or_else(|| body.pointer("/sessionId").and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                ClipError::render(
                    url,
                    "create session",
                    Some(anyhow::anyhow!("no session id in response")),
                )
            })
    }

    async fn navigate(&self, session: &str, url: &str) -> Result<(), ClipError> {
        self.wire_post(
            url,
            "navigate",
            format!("{}/session/{}/url", self.endpoint, session),
            json!({ "url": url }),
        )
        .await?;
        Ok(())
    }

    async fn page_source(&self, session: &str, url: &str) -> Result<String, ClipError> {
        let wire = format!("{}/session/{}/source", self.endpoint, session);
        let response = self
            .client
            .get(&wire)
            .send()
            .await
            .map_err(|e| ClipError::render(url, "page source", Some(e.into())))?;
        let body: Value = response.json().await.map_err(|e| {
            ClipError::render(
                url,
                "page source",
                Some(anyhow::anyhow!("bad wire response: {}", e)),
            )
        })?;
        if let Some(err) = Self::wire_error(&body) {
            return Err(ClipError::render(url, "page source", Some(anyhow::anyhow!(err))));
        }
        body.pointer("/value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ClipError::render(
                    url,
                    "page source",
                    Some(anyhow::anyhow!("no page source in response")),
                )
            })
    }

    async fn delete_session(&self, session: &str) {
        let wire = format!("{}/session/{}", self.endpoint, session);
        // Best effort; a leaked session dies with the driver process.
        let _ = self.client.delete(&wire).send().await;
    }
}

#[async_trait]
impl PageFetcher for RenderFetcher {
    async fn get_once(&self, url: &str) -> Result<String, ClipError> {
        if url.is_empty() {
            return Err(ClipError::invalid_url(url, "render page", None));
        }
        let session = self.create_session(url).await?;
        let outcome = async {
            self.navigate(&session, url).await?;
            if !self.settle.is_zero() {
                tokio::time::sleep(self.settle).await;
            }
            self.page_source(&session, url).await
        }
        .await;
        self.delete_session(&session).await;
        outcome
    }

    fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}
