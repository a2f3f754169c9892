// ABOUTME: Data-driven extraction rules: selector chains, href filters, and the epoch table.
// ABOUTME: RuleTable maps (source, timestamp) to the rule active at that time.

//! Per-source, per-epoch extraction rules.
//!
//! A source's markup changes over time; each change gets a new epoch with its
//! own rule. Rules are plain data (JSON-loadable), so adding a source or an
//! epoch never means new code.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::ClipError;
use crate::timestamp::serde_ts;

pub mod loader;

/// One step of a structured selector chain: an element name plus attribute
/// filters. `class` and `id` filters match the way CSS does (token and
/// exact respectively); any other attribute becomes an exact `[k="v"]`
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStep {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl SelectorStep {
    fn css_fragment(&self) -> String {
        let mut out = self.tag.clone().unwrap_or_else(|| "*".to_string());
        for (key, value) in &self.attrs {
            match key.as_str() {
                "class" => {
                    for class in value.split_whitespace() {
                        out.push('.');
                        out.push_str(class);
                    }
                }
                "id" => {
                    out.push('#');
                    out.push_str(value);
                }
                _ => {
                    out.push('[');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push_str("\"]");
                }
            }
        }
        out
    }
}

/// A selector chain locating anchor elements. Either a ready CSS string
/// (steps separated by descendant combinators) or the structured step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainSpec {
    /// e.g. `"div.trending h3 a"`
    Css(String),
    /// e.g. `[{"tag": "a", "attrs": {"class": "article"}}]`
    Steps(Vec<SelectorStep>),
}

impl ChainSpec {
    /// Render the chain as a CSS selector string.
    pub fn to_css(&self) -> String {
        match self {
            ChainSpec::Css(css) => css.clone(),
            ChainSpec::Steps(steps) => steps
                .iter()
                .map(SelectorStep::css_fragment)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A selection strategy for one source during one epoch: selector chains
/// finding anchors, regex filters accepting hrefs (OR across filters,
/// matched from the start), and a base for resolving relative hrefs.
///
/// The JSON field names (`css`, `re`, `base`) are the table's data
/// vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRule {
    #[serde(default)]
    pub css: Vec<ChainSpec>,
    #[serde(default, rename = "re")]
    pub filters: Vec<String>,
    #[serde(default)]
    pub base: String,
}

impl ExtractionRule {
    /// Compile selectors and filters, validating the rule. Filters gain a
    /// `^(?:...)` wrapper so they must match at the start of an href, never
    /// merely somewhere inside it.
    pub fn compile(&self) -> Result<CompiledRule, ClipError> {
        if self.css.is_empty() {
            return Err(ClipError::rules(
                "",
                "compile rule",
                Some(anyhow::anyhow!("a rule needs at least one selector chain")),
            ));
        }
        if self.filters.is_empty() {
            return Err(ClipError::rules(
                "",
                "compile rule",
                Some(anyhow::anyhow!("a rule needs at least one href filter")),
            ));
        }
        let mut selectors = Vec::with_capacity(self.css.len());
        for chain in &self.css {
            let css = chain.to_css();
            let selector = Selector::parse(&css).map_err(|e| {
                ClipError::rules(css.clone(), "compile selector", Some(anyhow::anyhow!("{e}")))
            })?;
            selectors.push(selector);
        }
        let mut filters = Vec::with_capacity(self.filters.len());
        for pattern in &self.filters {
            let anchored = format!("^(?:{})", pattern);
            let regex = Regex::new(&anchored).map_err(|e| {
                ClipError::rules(pattern.clone(), "compile filter", Some(e.into()))
            })?;
            filters.push(regex);
        }
        Ok(CompiledRule {
            selectors,
            filters,
            base: self.base.clone(),
        })
    }
}

/// A rule with selectors and filters compiled, ready for extraction.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selectors: Vec<Selector>,
    pub filters: Vec<Regex>,
    pub base: String,
}

/// A time-bounded version of a source's rule, active from `start` until
/// superseded by a later epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    #[serde(with = "serde_ts")]
    pub start: NaiveDateTime,
    #[serde(flatten)]
    pub rule: ExtractionRule,
}

/// Maps a source identifier to its epochs, held in descending start order.
#[derive(Debug, Default, Clone)]
pub struct RuleTable {
    sources: HashMap<String, Vec<Epoch>>,
}

impl RuleTable {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a whole table from JSON:
    /// `{"fox": [{"start": "20110101_000000", "css": [...], "re": [...], "base": "..."}]}`.
    pub fn from_json(json: &str) -> Result<Self, ClipError> {
        let raw: HashMap<String, Vec<Epoch>> = serde_json::from_str(json)
            .map_err(|e| ClipError::rules("rule table", "parse json", Some(e.into())))?;
        let mut table = Self::new();
        for (source, epochs) in raw {
            table.register(&source, epochs)?;
        }
        Ok(table)
    }

    /// Registers a source's epochs, validating every rule, sorting epochs
    /// descending by start, and rejecting duplicate starts.
    pub fn register(&mut self, source: &str, mut epochs: Vec<Epoch>) -> Result<(), ClipError> {
        for epoch in &epochs {
            epoch.rule.compile().map_err(|e| {
                ClipError::rules(source, "register source", Some(anyhow::anyhow!(e)))
            })?;
        }
        epochs.sort_by(|a, b| b.start.cmp(&a.start));
        for pair in epochs.windows(2) {
            if pair[0].start == pair[1].start {
                return Err(ClipError::rules(
                    source,
                    "register source",
                    Some(anyhow::anyhow!(
                        "duplicate epoch start {}",
                        pair[0].start.format(crate::timestamp::TS_FORMAT)
                    )),
                ));
            }
        }
        self.sources.insert(source.to_string(), epochs);
        Ok(())
    }

    /// Resolve the rule active for `source` at `at`: the epoch with the
    /// greatest start not after `at`. `NotFound` means the caller should
    /// skip the document and continue.
    pub fn resolve(&self, source: &str, at: NaiveDateTime) -> Result<&ExtractionRule, ClipError> {
        let epochs = self
            .sources
            .get(source)
            .ok_or_else(|| ClipError::not_found(source, "resolve rule"))?;
        epochs
            .iter()
            .find(|epoch| epoch.start <= at)
            .map(|epoch| &epoch.rule)
            .ok_or_else(|| ClipError::not_found(source, "resolve rule"))
    }

    /// The epochs registered for a source, newest first.
    pub fn get(&self, source: &str) -> Option<&[Epoch]> {
        self.sources.get(source).map(Vec::as_slice)
    }

    /// Iterate configured source identifiers (unordered).
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Returns the number of configured sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no sources are configured.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
