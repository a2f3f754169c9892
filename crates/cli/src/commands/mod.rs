// ABOUTME: The four driver commands behind the newsrack binary.
// ABOUTME: Shared fetcher selection lives here; each driver gets its own module.

pub mod homepage;
pub mod replay;
pub mod snapshots;
pub mod top10;

use newsrack_clipper::error::ClipError;
use newsrack_clipper::fetch::{FetchConfig, HttpFetcher, PageFetcher, RenderFetcher};
use url::Url;

/// The HTTP client plus, when any part of the run asked for it, the
/// rendering client. Rows pick per fetch.
pub(crate) struct FetcherSet {
    http: HttpFetcher,
    render: Option<RenderFetcher>,
}

impl FetcherSet {
    pub fn new(config: &FetchConfig, with_render: bool) -> Result<Self, ClipError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            render: with_render
                .then(|| RenderFetcher::new(config))
                .transpose()?,
        })
    }

    pub fn pick(&self, render: bool) -> &dyn PageFetcher {
        match (render, self.render.as_ref()) {
            (true, Some(render)) => render,
            _ => &self.http,
        }
    }
}

/// `scheme://host[:port]` of a page URL, for grounding relative hrefs on the
/// site that served them.
pub(crate) fn site_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let mut origin = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        origin.push_str(&format!(":{}", port));
    }
    Some(origin)
}
