//! Placeholder scanning and substitution
//!
//! A placeholder is `{` followed by one or more ASCII letters, digits, or
//! periods, followed by `}`, e.g. `{author.firstName}`.

use indexmap::IndexSet;
use regex_lite::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::OnceLock;

/// Placeholder pattern as written in template documents
pub const PLACEHOLDER_PATTERN: &str = r"(?i)\{[a-z0-9.]+\}";

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern compiles"))
}

/// Key path inside a placeholder token (`{a.b}` -> `a.b`)
pub fn key_path_of(token: &str) -> &str {
    token
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(token)
}

/// All placeholder occurrences found in one pass over a text
#[derive(Debug, Clone)]
pub struct PlaceholderScan<'a> {
    content: &'a str,
    spans: Vec<Range<usize>>,
}

impl<'a> PlaceholderScan<'a> {
    pub fn new(content: &'a str) -> Self {
        let spans = placeholder_regex()
            .find_iter(content)
            .map(|m| m.range())
            .collect();
        Self { content, spans }
    }

    /// Number of occurrences
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Distinct tokens (with braces) in first-occurrence order
    pub fn distinct(&self) -> IndexSet<&'a str> {
        self.spans
            .iter()
            .map(|span| &self.content[span.clone()])
            .collect()
    }

    /// Rebuild the text with each occurrence replaced by its value
    ///
    /// Tokens missing from `values` are kept as written. Replacement text is
    /// never scanned again.
    pub fn substitute(&self, values: &HashMap<&str, String>) -> String {
        let mut out = String::with_capacity(self.content.len());
        let mut last = 0;

        for span in &self.spans {
            let token = &self.content[span.clone()];
            out.push_str(&self.content[last..span.start]);
            match values.get(token) {
                Some(value) => out.push_str(value),
                None => out.push_str(token),
            }
            last = span.end;
        }

        out.push_str(&self.content[last..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scan_finds_all_occurrences() {
        let scan = PlaceholderScan::new("<w:t>{name} and {name} at {time}</w:t>");
        assert_eq!(scan.len(), 3);
        assert_eq!(scan.distinct().into_iter().collect::<Vec<_>>(), vec!["{name}", "{time}"]);
    }

    #[test]
    fn test_pattern_rejects_invalid_tokens() {
        assert!(PlaceholderScan::new("{}").is_empty());
        assert!(PlaceholderScan::new("{first name}").is_empty());
        assert!(PlaceholderScan::new("{first_name}").is_empty());
        assert!(PlaceholderScan::new("{ name }").is_empty());
    }

    #[test]
    fn test_mixed_case_and_dots() {
        let scan = PlaceholderScan::new("{Author.FirstName}{a.0.b}");
        assert_eq!(
            scan.distinct().into_iter().collect::<Vec<_>>(),
            vec!["{Author.FirstName}", "{a.0.b}"]
        );
    }

    #[test]
    fn test_nested_braces_match_innermost() {
        let scan = PlaceholderScan::new("{{x}}");
        assert_eq!(scan.distinct().into_iter().collect::<Vec<_>>(), vec!["{x}"]);

        let mut values = HashMap::new();
        values.insert("{x}", "V".to_string());
        assert_eq!(scan.substitute(&values), "{V}");
    }

    #[test]
    fn test_key_path_of() {
        assert_eq!(key_path_of("{author.firstName}"), "author.firstName");
        assert_eq!(key_path_of("time"), "time");
    }

    #[test]
    fn test_substitute_keeps_unknown_tokens() {
        let scan = PlaceholderScan::new("{a}-{b}-{a}");
        let mut values = HashMap::new();
        values.insert("{a}", "1".to_string());
        assert_eq!(scan.substitute(&values), "1-{b}-1");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let scan = PlaceholderScan::new("{a}{b}");
        let mut values = HashMap::new();
        values.insert("{a}", "{b}".to_string());
        values.insert("{b}", "B".to_string());
        assert_eq!(scan.substitute(&values), "{b}B");
    }

    proptest! {
        #[test]
        fn prop_text_without_braces_is_untouched(text in "[^{}]*") {
            let scan = PlaceholderScan::new(&text);
            prop_assert!(scan.is_empty());
            prop_assert_eq!(scan.substitute(&HashMap::new()), text);
        }

        #[test]
        fn prop_every_inserted_placeholder_is_found(
            keys in proptest::collection::vec("[A-Za-z0-9.]{1,12}", 1..8),
            filler in "[^{}]{0,10}",
        ) {
            let content: String = keys.iter().map(|k| format!("{filler}{{{k}}}")).collect();
            let scan = PlaceholderScan::new(&content);
            prop_assert_eq!(scan.len(), keys.len());

            let values: HashMap<&str, String> = scan
                .distinct()
                .into_iter()
                .map(|token| (token, String::new()))
                .collect();
            prop_assert_eq!(scan.substitute(&values), filler.repeat(keys.len()));
        }
    }
}
