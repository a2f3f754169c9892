// ABOUTME: Plain HTTP fetcher over reqwest with a cookie jar, transparent
// ABOUTME: decompression, and charset-aware body decoding.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::ClipError;
use crate::retry::RetryPolicy;

use super::{FetchConfig, PageFetcher};

/// Cookie-aware HTTP client. Cookies live for the run; non-200 statuses and
/// transport errors both count as fetch failures and go through the shared
/// retry policy.
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ClipError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ClipError::fetch("", "build http client", Some(e.into())))?;
        Ok(Self {
            client,
            retry: config.retry(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_once(&self, url: &str) -> Result<String, ClipError> {
        if url.is_empty() {
            return Err(ClipError::invalid_url(url, "fetch page", None));
        }
        url::Url::parse(url).map_err(|e| {
            ClipError::invalid_url(url, "fetch page", Some(anyhow::anyhow!("{}", e)))
        })?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClipError::timeout(url, "fetch page", Some(e.into()))
            } else {
                ClipError::fetch(url, "fetch page", Some(e.into()))
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());
        if status != 200 {
            return Err(ClipError::fetch(
                url,
                "fetch page",
                Some(anyhow::anyhow!("HTTP status {}", status)),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            ClipError::fetch(url, "fetch page", Some(anyhow::anyhow!("read body: {}", e)))
        })?;
        Ok(decode_body(&body, content_type.as_deref()))
    }

    fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

/// Decode body bytes using the content-type charset when one is declared,
/// detecting the encoding otherwise. Undecodable sequences degrade to
/// replacement characters rather than failing the fetch.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    for part in content_type.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}
