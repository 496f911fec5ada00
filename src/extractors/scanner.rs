// src/extractors/scanner.rs

// --- Imports ---
use super::patterns::{header_patterns, HeaderMatch, ItemLabel};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// --- Data Structures ---

/// Half-open range of an item's body within the document text.
/// `header_start` is where the committed header occurrence begins, so
/// `header_start..start` is the header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetSpan {
    pub header_start: usize,
    pub start: usize,
    pub end: usize,
}

impl OffsetSpan {
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// Item spans for one document, ordered canonically. Offsets are byte
/// offsets into the UTF-8 text and always fall on character boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    spans: BTreeMap<ItemLabel, OffsetSpan>,
}

impl OffsetMap {
    pub fn get(&self, label: ItemLabel) -> Option<&OffsetSpan> {
        self.spans.get(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemLabel, &OffsetSpan)> {
        self.spans.iter().map(|(label, span)| (*label, span))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Labels that never committed, in canonical order.
    pub fn missing(&self) -> Vec<ItemLabel> {
        header_patterns()
            .iter()
            .map(|p| p.label)
            .filter(|label| !self.spans.contains_key(label))
            .collect()
    }

    fn close(&mut self, label: ItemLabel, header_start: usize, start: usize, end: usize) {
        self.spans.insert(label, OffsetSpan { header_start, start, end });
    }
}

/// Where a single forward scan stands. A label is only written to the
/// offset map when it is closed, either by the next committed label or by
/// the end of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    AwaitingFirstLabel,
    LabelOpen { label: ItemLabel, header: HeaderMatch },
}

impl ScanState {
    /// Start of the last committed header, or 0 before any commit.
    pub fn anchor(&self) -> usize {
        match self {
            ScanState::AwaitingFirstLabel => 0,
            ScanState::LabelOpen { header, .. } => header.start,
        }
    }

    /// Earliest offset a new header may start at without overlapping the open one.
    pub fn floor(&self) -> usize {
        match self {
            ScanState::AwaitingFirstLabel => 0,
            ScanState::LabelOpen { header, .. } => header.end,
        }
    }
}

/// Shared scanning capability. Implementors only decide which candidate
/// header occurrence to commit; span bookkeeping is common.
pub trait BoundaryScanner {
    /// Picks the committed occurrence among `candidates` (document order).
    fn choose(&self, text: &str, candidates: &[HeaderMatch], state: &ScanState) -> Option<HeaderMatch>;

    fn name(&self) -> &'static str;

    /// Walks the labels in canonical order and builds contiguous spans.
    fn scan(&self, text: &str) -> OffsetMap {
        let mut map = OffsetMap::default();
        let mut state = ScanState::AwaitingFirstLabel;

        for pattern in header_patterns() {
            let candidates = pattern.find_all(text);
            let Some(header) = self.choose(text, &candidates, &state) else {
                tracing::debug!(
                    item = %pattern.label,
                    candidates = candidates.len(),
                    strategy = self.name(),
                    "Item not located"
                );
                continue;
            };

            if let ScanState::LabelOpen { label, header: open } = state {
                map.close(label, open.start, open.end, header.start);
            }
            tracing::debug!(item = %pattern.label, start = header.start, end = header.end, "Committed header");
            state = ScanState::LabelOpen { label: pattern.label, header };
        }

        if let ScanState::LabelOpen { label, header } = state {
            map.close(label, header.start, header.end, text.len());
        }
        map
    }
}

/// The two disambiguation policies, selected once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanStrategy {
    /// Heavily tagged filings: skip occurrences clustered within
    /// `proximity` characters of the previous committed header.
    Html { proximity: usize },
    /// Near-plain-text filings: first occurrence after the open header.
    Legacy,
}

impl ScanStrategy {
    /// Format classifier: more than `threshold` elements means modern HTML.
    pub fn classify(markup_count: usize, threshold: usize, proximity: usize) -> Self {
        if markup_count > threshold {
            ScanStrategy::Html { proximity }
        } else {
            ScanStrategy::Legacy
        }
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl BoundaryScanner for ScanStrategy {
    fn choose(&self, text: &str, candidates: &[HeaderMatch], state: &ScanState) -> Option<HeaderMatch> {
        let floor = state.floor();
        let mut eligible = candidates.iter().copied().filter(|m| m.start >= floor);
        match self {
            ScanStrategy::Legacy => eligible.next(),
            ScanStrategy::Html { proximity } => {
                let anchor = state.anchor();
                eligible.find(|m| char_distance(text, anchor, m.start) > *proximity)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ScanStrategy::Html { .. } => "html",
            ScanStrategy::Legacy => "legacy",
        }
    }
}

/// Number of characters in `text[from..to]`, 0 when `to` precedes `from`.
fn char_distance(text: &str, from: usize, to: usize) -> usize {
    if to <= from {
        return 0;
    }
    text[from..to].chars().count()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const HTML: ScanStrategy = ScanStrategy::Html { proximity: 100 };

    /// Places each `(offset, snippet)` at its offset, padding with spaces.
    fn layout(parts: &[(usize, &str)], total: usize) -> String {
        let mut text = String::new();
        for (offset, snippet) in parts {
            assert!(text.len() <= *offset, "overlapping layout");
            text.push_str(&" ".repeat(offset - text.len()));
            text.push_str(snippet);
        }
        if text.len() < total {
            text.push_str(&"x".repeat(total - text.len()));
        }
        text
    }

    #[test]
    fn test_classifier_threshold() {
        assert_eq!(ScanStrategy::classify(501, 500, 100), ScanStrategy::Html { proximity: 100 });
        assert_eq!(ScanStrategy::classify(500, 500, 100), ScanStrategy::Legacy);
        assert_eq!(ScanStrategy::classify(0, 500, 100), ScanStrategy::Legacy);
    }

    #[test]
    fn test_legacy_two_labels() {
        let text = layout(&[(0, "ITEM 1. Business"), (300, "ITEM 1A. Risk Factors")], 400);
        let map = ScanStrategy::Legacy.scan(&text);

        let item1 = map.get(ItemLabel::Item1).unwrap();
        assert_eq!((item1.header_start, item1.start, item1.end), (0, 7, 300));
        let item1a = map.get(ItemLabel::Item1A).unwrap();
        assert_eq!((item1a.header_start, item1a.start, item1a.end), (300, 308, text.len()));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_html_skips_table_of_contents_repeat() {
        let text = layout(
            &[(10, "ITEM 7. Management's Discussion"), (5000, "ITEM 7. Management's Discussion"), (7000, "ITEM 8. Financial")],
            8000,
        );
        let map = HTML.scan(&text);

        let item7 = map.get(ItemLabel::Item7).unwrap();
        assert_eq!(item7.header_start, 5000);
        assert_eq!(item7.start, 5007);
        assert_eq!(item7.end, 7000);
        assert!(item7.slice(&text).starts_with(" Management's Discussion"));

        // Legacy would have committed the early occurrence.
        let legacy = ScanStrategy::Legacy.scan(&text);
        assert_eq!(legacy.get(ItemLabel::Item7).unwrap().header_start, 10);
    }

    #[test]
    fn test_html_proximity_is_relative_to_previous_header() {
        // ITEM 2 sits 60 characters after ITEM 1, then again far later.
        let text = layout(&[(200, "ITEM 1. a"), (260, "ITEM 2. b"), (900, "ITEM 2. c")], 1000);
        let map = HTML.scan(&text);
        assert_eq!(map.get(ItemLabel::Item1).unwrap().end, 900);
        assert_eq!(map.get(ItemLabel::Item2).unwrap().header_start, 900);
    }

    #[test]
    fn test_html_rejects_everything_near_document_start() {
        let text = layout(&[(5, "ITEM 1. too early")], 300);
        let map = HTML.scan(&text);
        assert!(map.get(ItemLabel::Item1).is_none());
        assert!(map.is_empty());
        assert_eq!(map.missing().len(), 20);
    }

    #[test]
    fn test_spans_are_contiguous_and_monotonic() {
        let text = layout(
            &[
                (150, "ITEM 1. a"),
                (400, "ITEM 1A. b"),
                (700, "ITEM 2. c"),
                (1000, "ITEM 7. d"),
                (1300, "ITEM 7A. e"),
                (1600, "ITEM 15. f"),
            ],
            2000,
        );
        for strategy in [HTML, ScanStrategy::Legacy] {
            let map = strategy.scan(&text);
            let spans: Vec<OffsetSpan> = map.iter().map(|(_, s)| *s).collect();
            assert_eq!(spans.len(), 6, "{}", strategy);
            for pair in spans.windows(2) {
                assert_eq!(pair[0].end, pair[1].header_start);
                assert!(pair[0].start <= pair[1].start);
            }
            assert_eq!(spans.last().unwrap().end, text.len());
        }
    }

    #[test]
    fn test_legacy_never_goes_backwards() {
        // ITEM 2 appears before ITEM 1's header and again after it.
        let text = layout(&[(0, "ITEM 2. stray"), (50, "ITEM 1. a"), (120, "ITEM 2. b")], 200);
        let map = ScanStrategy::Legacy.scan(&text);
        assert_eq!(map.get(ItemLabel::Item1).unwrap().end, 120);
        assert_eq!(map.get(ItemLabel::Item2).unwrap().header_start, 120);
    }

    #[test]
    fn test_unlocated_labels_are_absent() {
        let text = layout(&[(0, "ITEM 1. a"), (100, "ITEM 3. c")], 200);
        let map = ScanStrategy::Legacy.scan(&text);
        assert!(map.get(ItemLabel::Item2).is_none());
        assert_eq!(map.get(ItemLabel::Item1).unwrap().end, 100);
        assert!(map.missing().contains(&ItemLabel::Item2));
        assert!(!map.missing().contains(&ItemLabel::Item3));
    }

    #[test]
    fn test_case_fallback_matches_uppercase_rendering() {
        let upper = layout(&[(200, "ITEM 7. body"), (600, "ITEM 8. more")], 900);
        let mixed = layout(&[(200, "Item 7. body"), (600, "Item 8. more")], 900);
        for strategy in [HTML, ScanStrategy::Legacy] {
            let a = strategy.scan(&upper);
            let b = strategy.scan(&mixed);
            assert_eq!(a.get(ItemLabel::Item7), b.get(ItemLabel::Item7));
            assert!(b.get(ItemLabel::Item7).is_some());
        }
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = layout(&[(120, "ITEM 1. a"), (500, "ITEM 5. b"), (900, "ITEM 9A. c")], 1200);
        assert_eq!(HTML.scan(&text), HTML.scan(&text));
        assert_eq!(ScanStrategy::Legacy.scan(&text), ScanStrategy::Legacy.scan(&text));
    }

    #[test]
    fn test_proximity_counts_characters_not_bytes() {
        // 60 multi-byte characters (180 bytes) between the headers.
        let text = format!("{}ITEM 1. {}ITEM 2. tail", " ".repeat(150), "€".repeat(60));
        let map = HTML.scan(&text);
        assert!(map.get(ItemLabel::Item1).is_some());
        assert!(map.get(ItemLabel::Item2).is_none());
    }
}
