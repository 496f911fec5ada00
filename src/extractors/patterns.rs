// src/extractors/patterns.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// Separator tolerated between the two header tokens: any whitespace
/// (U+00A0 included, since `\s` is Unicode-aware), a literal newline, or a
/// raw `&nbsp;` entity that survived text conversion.
const TOKEN_SEPARATOR: &str = r"(?:\s|&nbsp;|\n)*";

// --- Data Structures ---

/// The twenty standardized sections of an annual report, in canonical order.
/// Variant order is the scan order, so `Ord` follows the filing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemLabel {
    Item1,
    Item1A,
    Item1B,
    Item2,
    Item3,
    Item4,
    Item5,
    Item6,
    Item7,
    Item7A,
    Item8,
    Item9,
    Item9A,
    Item9B,
    Item10,
    Item11,
    Item12,
    Item13,
    Item14,
    Item15,
}

pub const ITEMS_10K: [ItemLabel; 20] = [
    ItemLabel::Item1,
    ItemLabel::Item1A,
    ItemLabel::Item1B,
    ItemLabel::Item2,
    ItemLabel::Item3,
    ItemLabel::Item4,
    ItemLabel::Item5,
    ItemLabel::Item6,
    ItemLabel::Item7,
    ItemLabel::Item7A,
    ItemLabel::Item8,
    ItemLabel::Item9,
    ItemLabel::Item9A,
    ItemLabel::Item9B,
    ItemLabel::Item10,
    ItemLabel::Item11,
    ItemLabel::Item12,
    ItemLabel::Item13,
    ItemLabel::Item14,
    ItemLabel::Item15,
];

impl ItemLabel {
    /// Canonical label text, e.g. "ITEM 7A".
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemLabel::Item1 => "ITEM 1",
            ItemLabel::Item1A => "ITEM 1A",
            ItemLabel::Item1B => "ITEM 1B",
            ItemLabel::Item2 => "ITEM 2",
            ItemLabel::Item3 => "ITEM 3",
            ItemLabel::Item4 => "ITEM 4",
            ItemLabel::Item5 => "ITEM 5",
            ItemLabel::Item6 => "ITEM 6",
            ItemLabel::Item7 => "ITEM 7",
            ItemLabel::Item7A => "ITEM 7A",
            ItemLabel::Item8 => "ITEM 8",
            ItemLabel::Item9 => "ITEM 9",
            ItemLabel::Item9A => "ITEM 9A",
            ItemLabel::Item9B => "ITEM 9B",
            ItemLabel::Item10 => "ITEM 10",
            ItemLabel::Item11 => "ITEM 11",
            ItemLabel::Item12 => "ITEM 12",
            ItemLabel::Item13 => "ITEM 13",
            ItemLabel::Item14 => "ITEM 14",
            ItemLabel::Item15 => "ITEM 15",
        }
    }

    /// Splits the label into its leading ("ITEM") and trailing ("7A") tokens.
    pub fn tokens(&self) -> (&'static str, &'static str) {
        self.as_str()
            .split_once(' ')
            .unwrap_or((self.as_str(), ""))
    }

    pub fn parse(label: &str) -> Option<ItemLabel> {
        let normalized = label.trim().to_uppercase();
        ITEMS_10K.iter().copied().find(|item| item.as_str() == normalized)
    }
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One header occurrence found in the plain text.
/// `start..end` covers the header itself, trailing period included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub start: usize,
    pub end: usize,
}

/// Compiled matcher for one item label: the exact-case pattern plus the
/// "Item"-cased fallback used when the exact form never appears.
#[derive(Debug)]
pub struct HeaderPattern {
    pub label: ItemLabel,
    exact: Regex,
    folded: Regex,
}

impl HeaderPattern {
    pub fn new(label: ItemLabel) -> Result<Self, regex::Error> {
        let (leading, trailing) = label.tokens();
        let exact = Regex::new(&header_regex(leading, trailing))?;
        let folded = Regex::new(&header_regex(&initial_capital(leading), trailing))?;
        Ok(Self { label, exact, folded })
    }

    /// All occurrences in document order. The folded-case pattern is only
    /// tried when the exact-case pattern finds nothing anywhere in the text.
    pub fn find_all(&self, text: &str) -> Vec<HeaderMatch> {
        let exact = collect_matches(&self.exact, text);
        if !exact.is_empty() {
            return exact;
        }
        let folded = collect_matches(&self.folded, text);
        if !folded.is_empty() {
            tracing::trace!(item = %self.label, "Header found only in folded case");
        }
        folded
    }
}

fn header_regex(leading: &str, trailing: &str) -> String {
    format!(
        "{}{}{}\\.",
        regex::escape(leading),
        TOKEN_SEPARATOR,
        regex::escape(trailing)
    )
}

/// "ITEM" -> "Item"
fn initial_capital(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn collect_matches(re: &Regex, text: &str) -> Vec<HeaderMatch> {
    re.find_iter(text)
        .map(|m| HeaderMatch { start: m.start(), end: m.end() })
        .collect()
}

// --- Pattern Library (Lazy Static) ---
// Every label's pattern is built from escaped fixed tokens, so compilation
// cannot fail; a failure here is dropped rather than aborting extraction.
static HEADER_PATTERNS: Lazy<Vec<HeaderPattern>> = Lazy::new(|| {
    ITEMS_10K
        .iter()
        .filter_map(|label| match HeaderPattern::new(*label) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::error!(item = %label, "Failed to compile header pattern: {}", e);
                None
            }
        })
        .collect()
});

/// Header matchers for all labels, in canonical scan order.
pub fn header_patterns() -> &'static [HeaderPattern] {
    &HEADER_PATTERNS
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(label: ItemLabel) -> HeaderPattern {
        HeaderPattern::new(label).unwrap()
    }

    #[test]
    fn test_library_covers_all_labels_in_order() {
        let labels: Vec<&str> = header_patterns().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "ITEM 1", "ITEM 1A", "ITEM 1B", "ITEM 2", "ITEM 3", "ITEM 4", "ITEM 5",
                "ITEM 6", "ITEM 7", "ITEM 7A", "ITEM 8", "ITEM 9", "ITEM 9A", "ITEM 9B",
                "ITEM 10", "ITEM 11", "ITEM 12", "ITEM 13", "ITEM 14", "ITEM 15",
            ]
        );
    }

    #[test]
    fn test_separator_variants() {
        let p = pattern(ItemLabel::Item7A);
        for text in [
            "ITEM 7A.",
            "ITEM   7A.",
            "ITEM\n7A.",
            "ITEM&nbsp;7A.",
            "ITEM&nbsp; &nbsp;\n7A.",
            "ITEM\u{a0}7A.",
            "ITEM7A.",
        ] {
            assert_eq!(p.find_all(text).len(), 1, "should match {:?}", text);
        }
    }

    #[test]
    fn test_requires_trailing_period() {
        let p = pattern(ItemLabel::Item7);
        assert!(p.find_all("ITEM 7 Management's Discussion").is_empty());
        assert!(p.find_all("ITEM 7A. Quantitative").is_empty());
    }

    #[test]
    fn test_numeric_prefix_does_not_leak_between_labels() {
        let p = pattern(ItemLabel::Item1);
        assert!(p.find_all("ITEM 10. ITEM 11. ITEM 1A.").is_empty());
        let m = p.find_all("ITEM 10. ITEM 1. Business");
        assert_eq!(m, vec![HeaderMatch { start: 9, end: 16 }]);
    }

    #[test]
    fn test_folded_case_only_when_exact_absent() {
        let p = pattern(ItemLabel::Item7);
        assert_eq!(p.find_all("Item 7. MD&A").len(), 1);
        // Exact-case hit suppresses the fallback entirely.
        let both = p.find_all("Item 7. toc ITEM 7. body");
        assert_eq!(both, vec![HeaderMatch { start: 12, end: 19 }]);
        assert!(p.find_all("item 7. lower").is_empty());
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(ItemLabel::parse("item 9b"), Some(ItemLabel::Item9B));
        assert_eq!(ItemLabel::parse("ITEM 16"), None);
        assert_eq!(ItemLabel::Item7A.tokens(), ("ITEM", "7A"));
    }
}
