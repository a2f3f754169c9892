// ABOUTME: Keyword and summary extraction over parsed article text.
// ABOUTME: Frequency-ranked keywords with a title boost; top sentences kept in document order.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// How many keywords an article gets at most.
pub const MAX_KEYWORDS: usize = 10;

/// How many sentences a summary gets at most.
pub const MAX_SUMMARY_SENTENCES: usize = 5;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
        "was", "one", "our", "out", "day", "get", "has", "him", "his", "how", "man", "new",
        "now", "old", "see", "two", "way", "who", "did", "its", "let", "put", "say", "she",
        "too", "use", "that", "with", "have", "this", "will", "your", "from", "they", "know",
        "want", "been", "good", "much", "some", "time", "very", "when", "come", "here", "just",
        "like", "long", "make", "many", "more", "most", "over", "such", "take", "than", "them",
        "well", "were", "what", "where", "which", "while", "would", "there", "their", "about",
        "after", "again", "before", "being", "between", "both", "could", "does", "down",
        "during", "each", "other", "into", "only", "same", "should", "since", "still", "then",
        "these", "those", "through", "under", "until", "also", "because", "said", "says",
        "told", "against", "among", "around", "became", "become", "first", "found", "made",
        "might", "must", "never", "off", "once", "people", "per", "back", "even", "may",
        "own", "part", "several", "another", "however", "without", "year", "years",
    ]
    .into_iter()
    .collect()
});

/// Words worth counting: lowercased, longer than two characters, carrying at
/// least one letter, not a stopword.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .filter(|w| w.chars().any(char::is_alphabetic))
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(w.as_str()))
}

/// Top terms by frequency. Headline terms count double so a word that only
/// appears in the title can still surface. Ties break alphabetically to keep
/// the output stable.
pub fn keywords(title: &str, text: &str) -> Vec<String> {
    let mut freq: HashMap<String, u32> = HashMap::new();
    for word in tokenize(text) {
        *freq.entry(word).or_insert(0) += 1;
    }
    for word in tokenize(title) {
        *freq.entry(word).or_insert(0) += 2;
    }

    let mut ranked: Vec<(String, u32)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _)| word)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(['.', '?', '!'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The sentences scoring highest on keyword hits, re-joined in document
/// order. Empty when the text has no keyword-bearing sentences.
pub fn summary(title: &str, text: &str) -> String {
    let terms: HashSet<String> = keywords(title, text).into_iter().collect();
    let sentences = split_sentences(text);

    let mut scored: Vec<(usize, usize, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(position, sentence)| {
            let hits = tokenize(sentence).filter(|w| terms.contains(w)).count();
            (position, hits, *sentence)
        })
        .filter(|(_, hits, _)| *hits > 0)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let mut picked: Vec<(usize, &str)> = scored
        .into_iter()
        .take(MAX_SUMMARY_SENTENCES)
        .map(|(position, _, sentence)| (position, sentence))
        .collect();
    picked.sort_by_key(|(position, _)| *position);

    picked
        .into_iter()
        .map(|(_, sentence)| sentence)
        .collect::<Vec<_>>()
        .join(" ")
}
