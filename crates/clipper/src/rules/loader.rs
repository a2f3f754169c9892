// ABOUTME: Loader for rule tables from embedded JSON data and operator-supplied files.
// ABOUTME: Ships builtin tables for homepage links and most-popular modules.

//! Rule table loaders.
//!
//! Two tables ship embedded: the homepage table (what counts as an article
//! link on a source's front page) and the top10 table (where a source's
//! most-popular module lives). Operators can load a replacement table from a
//! JSON file at runtime.

use std::path::Path;

use crate::error::ClipError;
use crate::rules::RuleTable;

/// Embedded JSON for the homepage link rules.
const HOMEPAGE_RULES_JSON: &str = include_str!("../../data/homepage_rules.json");

/// Embedded JSON for the most-popular module rules.
const TOP10_RULES_JSON: &str = include_str!("../../data/top10_rules.json");

/// Loads the builtin homepage rule table from embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or fails validation.
pub fn load_homepage_table() -> RuleTable {
    RuleTable::from_json(HOMEPAGE_RULES_JSON).expect("failed to parse builtin homepage rules")
}

/// Loads the builtin most-popular module rule table from embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or fails validation.
pub fn load_top10_table() -> RuleTable {
    RuleTable::from_json(TOP10_RULES_JSON).expect("failed to parse builtin top10 rules")
}

/// Loads a rule table from a JSON file on disk. Used for operator-supplied
/// tables replacing the builtins.
pub fn load_table_from_path(path: &Path) -> Result<RuleTable, ClipError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| ClipError::rules(path.display().to_string(), "read rule file", Some(e.into())))?;
    RuleTable::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    #[test]
    fn homepage_table_loads() {
        let table = load_homepage_table();
        assert!(!table.is_empty());
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn homepage_table_has_two_usat_epochs() {
        let table = load_homepage_table();
        let epochs = table.get("usat").expect("usat configured");
        assert_eq!(epochs.len(), 2);
        // Newest first.
        assert!(epochs[0].start > epochs[1].start);
    }

    #[test]
    fn homepage_fox_rule_matches_dated_story_paths() {
        let table = load_homepage_table();
        let at = parse_timestamp("20130601_000000").unwrap();
        let compiled = table.resolve("fox", at).unwrap().compile().unwrap();
        assert!(compiled.filters[0].is_match("/web/20130601/http://www.foxnews.com/politics/2013/06/01/some-story/"));
        assert!(!compiled.filters[0].is_match("/about/contact"));
    }

    #[test]
    fn homepage_yahoo_epochs_switch_at_2012() {
        let table = load_homepage_table();
        let early = parse_timestamp("20110601_000000").unwrap();
        let late = parse_timestamp("20120601_000000").unwrap();
        let rule_2011 = table.resolve("yahoo", early).unwrap();
        let rule_2012 = table.resolve("yahoo", late).unwrap();
        assert_ne!(rule_2011.filters, rule_2012.filters);
    }

    #[test]
    fn top10_table_loads_with_module_chains() {
        let table = load_top10_table();
        assert!(table.len() >= 8);
        let at = parse_timestamp("20120801_000000").unwrap();
        let rule = table.resolve("fox", at).unwrap();
        assert_eq!(rule.css[0].to_css(), "div.trending-descending h3 a");

        let at_2016 = parse_timestamp("20160801_000000").unwrap();
        let rule = table.resolve("fox", at_2016).unwrap();
        assert_eq!(rule.css[0].to_css(), "section#trending h3 a");
    }

    #[test]
    fn every_builtin_rule_compiles() {
        for table in [load_homepage_table(), load_top10_table()] {
            for source in table.sources() {
                for epoch in table.get(source).unwrap() {
                    epoch
                        .rule
                        .compile()
                        .unwrap_or_else(|e| panic!("{source}: {e}"));
                }
            }
        }
    }

    #[test]
    fn load_from_path_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"example": [{"start": "20200101_000000", "css": ["a"], "re": [".*"], "base": ""}]}"#,
        )
        .unwrap();
        let table = load_table_from_path(&path).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn load_from_missing_path_errors() {
        let err = load_table_from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.is_rules());
    }
}
