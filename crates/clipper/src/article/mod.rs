// ABOUTME: Article page download and field extraction for enrichment.
// ABOUTME: Meta-first title/image/author heuristics plus paragraph-density body scoring.

//! Article extraction.
//!
//! [`parse`] pulls title, body text, lead image, and authors out of raw
//! markup. [`ArticleExtractor`] wraps that in a download loop that treats a
//! titleless page as a failed attempt and walks repaired URL variants when a
//! page refuses to come back whole. Keyword and summary generation live in
//! [`nlp`].

pub mod nlp;

use std::collections::{HashMap, HashSet};

use ego_tree::NodeId;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::ClipError;
use crate::fetch::{FetchConfig, HttpFetcher, PageFetcher};
use crate::retry::RetryPolicy;

/// Title sources in priority order, before falling back to `<title>` and
/// `<h1>` text.
const TITLE_META_SELECTORS: &[&str] = &[
    "meta[property='og:title']",
    "meta[name='twitter:title']",
];

/// Author sources in priority order. Meta tags first, then visible bylines.
const AUTHOR_SELECTORS: &[&str] = &[
    "meta[name='author']",
    "meta[property='article:author']",
    ".byline",
    ".author",
    "[rel='author']",
    "[itemprop='author']",
];

/// Lead image sources in priority order, before falling back to the first
/// usable `<img>`.
const IMAGE_META_SELECTORS: &[(&str, &str)] = &[
    ("meta[property='og:image']", "content"),
    ("meta[name='twitter:image']", "content"),
    ("link[rel='image_src']", "href"),
];

/// Fields pulled out of one article page. Any of them may be empty on thin
/// pages; only an empty title counts as an extraction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,
    pub text: String,
    pub top_image: String,
    pub authors: Vec<String>,
}

/// A successfully downloaded and parsed article.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    /// The URL variant that actually answered.
    pub url: String,
    /// Raw page markup, kept for archiving.
    pub html: String,
    pub article: ParsedArticle,
}

/// The URL variants enrichment walks, in order: the URL as discovered, the
/// query string stripped, and, when the stripped form still embeds a second
/// `http://` (archive replay links do), the substring from the last one.
pub fn url_variants(url: &str) -> Vec<String> {
    let mut variants = vec![url.to_string()];

    let stripped = match url.split_once('?') {
        Some((head, _)) => head,
        None => url,
    };
    if stripped != url {
        variants.push(stripped.to_string());
    }

    if stripped.matches("http://").count() > 1 {
        if let Some(at) = stripped.rfind("http://") {
            variants.push(stripped[at..].to_string());
        }
    }

    variants
}

/// Pull the standard fields out of one article page. Never fails; thin pages
/// just come back with empty fields.
pub fn parse(html: &str) -> ParsedArticle {
    let doc = Html::parse_document(html);
    ParsedArticle {
        title: extract_title(&doc),
        text: extract_text(&doc),
        top_image: extract_top_image(&doc),
        authors: extract_authors(&doc),
    }
}

/// First non-empty value of `attr` under `selector`.
fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    for el in doc.select(&sel) {
        if let Some(value) = el.value().attr(attr) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(doc: &Html) -> String {
    for sel in TITLE_META_SELECTORS {
        if let Some(title) = first_attr(doc, sel, "content") {
            return title;
        }
    }
    for sel_str in ["title", "h1"] {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            let text = collapse_whitespace(&el.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// One paragraph's contribution to its container: comma count plus one point
/// per 50 characters, with a penalty for stubs so navigation crumbs sink.
fn score_paragraph(text: &str) -> i32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    let commas = text.matches(',').count() as i32;
    let mut score = commas + (chars / 50) as i32;
    if chars < 20 {
        score -= 3;
    }
    score
}

/// The article body. Direct `<p>` children are grouped by parent and the
/// parent with the highest combined score wins; its paragraphs come back in
/// document order, joined by blank lines.
fn extract_text(doc: &Html) -> String {
    let p = match Selector::parse("p") {
        Ok(sel) => sel,
        Err(_) => return String::new(),
    };

    let mut containers: HashMap<NodeId, (i32, usize, Vec<String>)> = HashMap::new();
    for el in doc.select(&p) {
        let Some(parent) = el.parent() else {
            continue;
        };
        let text = collapse_whitespace(&el.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        let next = containers.len();
        let entry = containers.entry(parent.id()).or_insert((0, next, Vec::new()));
        entry.0 += score_paragraph(&text);
        entry.2.push(text);
    }

    let mut ranked: Vec<(i32, usize, Vec<String>)> = containers.into_values().collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    match ranked.into_iter().next() {
        Some((score, _, paragraphs)) if score > 0 => paragraphs.join("\n\n"),
        _ => String::new(),
    }
}

fn extract_top_image(doc: &Html) -> String {
    for (sel, attr) in IMAGE_META_SELECTORS {
        if let Some(url) = first_attr(doc, sel, attr) {
            return url;
        }
    }
    // Last resort: the first <img> that points somewhere real.
    if let Ok(sel) = Selector::parse("img") {
        for el in doc.select(&sel) {
            if let Some(src) = el.value().attr("src") {
                let src = src.trim();
                if !src.is_empty() && !src.starts_with("data:") {
                    return src.to_string();
                }
            }
        }
    }
    String::new()
}

fn extract_authors(doc: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut authors = Vec::new();
    for sel_str in AUTHOR_SELECTORS {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        for el in doc.select(&sel) {
            let raw = if sel_str.starts_with("meta[") {
                el.value().attr("content").unwrap_or_default().to_string()
            } else {
                el.text().collect::<String>()
            };
            if let Some(name) = clean_author(&raw) {
                if seen.insert(name.clone()) {
                    authors.push(name);
                }
            }
        }
    }
    authors
}

/// Collapses whitespace and drops a leading "By" credit. None when nothing
/// is left.
fn clean_author(raw: &str) -> Option<String> {
    let joined = collapse_whitespace(raw);
    let name = joined
        .strip_prefix("By ")
        .or_else(|| joined.strip_prefix("by "))
        .unwrap_or(&joined)
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Downloads article pages with URL repair and whole-unit retry.
///
/// The retry wraps download and parse together: a page that answers 200 but
/// yields no title is as much a failure as a connection error, because
/// archive replay frequently serves interstitial shells.
pub struct ArticleExtractor {
    fetcher: HttpFetcher,
    retry: RetryPolicy,
}

impl ArticleExtractor {
    pub fn new(config: &FetchConfig) -> Result<Self, ClipError> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            retry: RetryPolicy::linear(config.attempts),
        })
    }

    /// Download one URL and parse it. Each attempt re-downloads; an empty
    /// title fails the attempt.
    pub async fn fetch_parsed(&self, url: &str) -> Result<FetchedArticle, ClipError> {
        self.retry
            .run(url, || async {
                let html = self.fetcher.get_once(url).await?;
                let article = parse(&html);
                if article.title.is_empty() {
                    return Err(ClipError::extract(
                        url,
                        "parse article",
                        Some(anyhow::anyhow!("page has no title")),
                    ));
                }
                Ok(FetchedArticle {
                    url: url.to_string(),
                    html,
                    article,
                })
            })
            .await
    }

    /// Walk the URL variants until one parses, returning the last error when
    /// every variant fails.
    pub async fn fetch_with_repair(&self, url: &str) -> Result<FetchedArticle, ClipError> {
        let mut last_err = None;
        for variant in url_variants(url) {
            if last_err.is_some() {
                debug!("{}: retrying with repaired URL", variant);
            }
            match self.fetch_parsed(&variant).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) => last_err = Some(err),
            }
        }
        // url_variants always yields at least the URL itself.
        Err(last_err.unwrap_or_else(|| ClipError::invalid_url(url, "fetch article", None)))
    }
}
