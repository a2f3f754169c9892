// ABOUTME: Text normalization applied to link text and enrichment fields before writing.
// ABOUTME: Repairs mojibake, collapses line breaks, strips ASCII punctuation except `.` and `?`.

use aho_corasick::AhoCorasick;
use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;

/// Characters that commonly lead a UTF-8 byte sequence mis-decoded as
/// Windows-1252. Their presence is only a trigger; the round-trip check in
/// `try_repair_once` decides whether a repair actually applies.
static MOJIBAKE_MARKERS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(["Â", "Ã", "â", "Ä", "Å", "ð"]).expect("static marker set")
});

/// One round-trip repair attempt: re-encode as Windows-1252 and strictly
/// re-decode as UTF-8. Any unmappable character or invalid byte sequence
/// means the text was not mojibake, and `None` is returned.
fn try_repair_once(text: &str) -> Option<String> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return None;
    }
    let repaired = String::from_utf8(bytes.into_owned()).ok()?;
    if repaired == text {
        return None;
    }
    Some(repaired)
}

/// Repair text that went through a UTF-8 -> Windows-1252 mis-decode, e.g.
/// `â€™` back to `’`. Doubly-garbled input is unwound iteratively so the
/// result is a fixpoint. Text that does not round-trip cleanly is returned
/// unchanged.
pub fn repair_mojibake(text: &str) -> String {
    if !MOJIBAKE_MARKERS.is_match(text) {
        return text.to_string();
    }
    let mut current = text.to_string();
    for _ in 0..4 {
        match try_repair_once(&current) {
            Some(repaired) => {
                current = repaired;
                if !MOJIBAKE_MARKERS.is_match(&current) {
                    break;
                }
            }
            None => break,
        }
    }
    current
}

/// Join a multi-line string into one line, turning every line break into a
/// single space.
fn collapse_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip all ASCII punctuation except the period and the question mark.
fn remove_special_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_ascii_punctuation() || c == '.' || c == '?')
        .collect()
}

/// Normalize a text field for the report: repair mojibake, collapse line
/// breaks into spaces, strip ASCII punctuation except `.` and `?`.
/// Idempotent: `clean_text(clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let text = repair_mojibake(text);
    let text = collapse_line_breaks(&text);
    remove_special_chars(&text)
}
