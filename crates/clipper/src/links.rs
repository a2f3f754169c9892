// ABOUTME: Link extraction: applies a compiled rule to a parsed page and collects candidates.
// ABOUTME: Dedupes (text, url) pairs per pass while preserving first-discovery order.

//! Candidate link extraction.
//!
//! Key behaviors:
//! - Every selector chain runs; matches union in document order per chain.
//! - Anchors without an href are skipped silently.
//! - An href is kept when any filter matches it from position 0.
//! - Hrefs that already carry a scheme pass through; everything else is
//!   concatenated onto the rule base.
//! - Exact duplicate (text, url) pairs collapse; first discovery wins.

use std::collections::HashSet;

use scraper::Html;
use serde::Serialize;
use url::Url;

use crate::rules::CompiledRule;

/// A (text, url) pair discovered on a page, prior to becoming a report
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateLink {
    pub text: String,
    pub url: String,
}

/// Resolve an href against the rule base: pass through hrefs that already
/// parse as absolute URLs, concatenate everything else.
fn resolve_href(href: &str, base: &str) -> String {
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(_) => format!("{}{}", base, href),
    }
}

/// Apply a compiled rule to a parsed document.
///
/// An empty result is a valid outcome: some pages simply have no matching
/// module on a given day.
pub fn extract(doc: &Html, rule: &CompiledRule) -> Vec<CandidateLink> {
    let mut seen: HashSet<CandidateLink> = HashSet::new();
    let mut found = Vec::new();
    for selector in &rule.selectors {
        for anchor in doc.select(selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !rule.filters.iter().any(|filter| filter.is_match(href)) {
                continue;
            }
            let candidate = CandidateLink {
                text: anchor.text().collect::<String>().trim().to_string(),
                url: resolve_href(href, &rule.base),
            };
            if seen.insert(candidate.clone()) {
                found.push(candidate);
            }
        }
    }
    found
}

/// Parse raw HTML and extract in one step.
pub fn extract_html(html: &str, rule: &CompiledRule) -> Vec<CandidateLink> {
    let doc = Html::parse_document(html);
    extract(&doc, rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ChainSpec, ExtractionRule};
    use pretty_assertions::assert_eq;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <body>
            <div class="trending">
                <h3><a href="/2012/05/01/first-story/">First story</a></h3>
                <h3><a href="/2012/05/02/second-story/">Second story</a></h3>
                <h3><a href="/2012/05/01/first-story/">First story</a></h3>
                <h3><a href="/about/contact">Contact us</a></h3>
                <h3><a>No href here</a></h3>
                <h3><a href="/2012/05/03/wordless-story/"></a></h3>
            </div>
            <div class="other">
                <a href="http://example.com/2012/05/04/absolute-story/">Absolute</a>
                <a href="/outside/2012/05/05/not-in-module/">Outside</a>
            </div>
        </body>
        </html>
    "#;

    fn rule(css: &[&str], filters: &[&str], base: &str) -> CompiledRule {
        ExtractionRule {
            css: css.iter().map(|s| ChainSpec::Css(s.to_string())).collect(),
            filters: filters.iter().map(|s| s.to_string()).collect(),
            base: base.to_string(),
        }
        .compile()
        .unwrap()
    }

    #[test]
    fn extracts_matching_links_in_discovery_order() {
        let rule = rule(
            &["div.trending h3 a"],
            &[r".*/\d{4}/\d{2}/\d{2}/.*/$"],
            "http://web.archive.org",
        );
        let links = extract_html(SAMPLE_HTML, &rule);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].text, "First story");
        assert_eq!(
            links[0].url,
            "http://web.archive.org/2012/05/01/first-story/"
        );
        assert_eq!(links[1].text, "Second story");
    }

    #[test]
    fn duplicate_pairs_collapse() {
        let rule = rule(&["a"], &[".*first-story.*"], "http://base");
        let links = extract_html(SAMPLE_HTML, &rule);
        // The page repeats the first-story anchor; only one candidate comes out.
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn anchors_without_href_are_skipped() {
        let rule = rule(&["a"], &[".*"], "");
        let links = extract_html(SAMPLE_HTML, &rule);
        assert!(links.iter().all(|l| !l.url.is_empty()));
    }

    #[test]
    fn empty_link_text_is_kept() {
        let rule = rule(&["a"], &[".*wordless.*"], "http://base");
        let links = extract_html(SAMPLE_HTML, &rule);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "");
        assert_eq!(links[0].url, "http://base/2012/05/03/wordless-story/");
    }

    #[test]
    fn filters_are_anchored_at_the_start() {
        let rule = rule(&["a"], &[r"/2012/\d{2}/\d{2}/.*"], "http://base");
        let links = extract_html(SAMPLE_HTML, &rule);
        // "/outside/2012/05/05/..." contains the shape mid-string but must
        // not match; the absolute URL candidate must not match either.
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.url.starts_with("http://base/2012/")));
    }

    #[test]
    fn any_filter_accepts_or_semantics() {
        let rule = rule(
            &["a"],
            &[r".*/contact$", r".*absolute-story/$"],
            "http://base",
        );
        let links = extract_html(SAMPLE_HTML, &rule);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn hrefs_with_scheme_pass_through_unchanged() {
        let rule = rule(&["div.other a"], &[".*"], "http://web.archive.org");
        let links = extract_html(SAMPLE_HTML, &rule);
        assert_eq!(links[0].url, "http://example.com/2012/05/04/absolute-story/");
        assert_eq!(
            links[1].url,
            "http://web.archive.org/outside/2012/05/05/not-in-module/"
        );
    }

    #[test]
    fn multiple_chains_union_in_order() {
        let rule = rule(&["div.other a", "div.trending h3 a"], &[".*"], "http://b");
        let links = extract_html(SAMPLE_HTML, &rule);
        // First chain's matches come first.
        assert_eq!(links[0].text, "Absolute");
        assert!(links.len() > 2);
    }

    #[test]
    fn no_matches_is_a_valid_empty_result() {
        let rule = rule(&["nav a"], &[".*"], "");
        let links = extract_html(SAMPLE_HTML, &rule);
        assert!(links.is_empty());
    }
}
