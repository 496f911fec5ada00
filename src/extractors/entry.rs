// src/extractors/entry.rs
use super::patterns::ItemLabel;
use super::scanner::OffsetMap;
use crate::filing::FilingIdentity;
use serde::Serialize;

/// One located item of one filing. Field names follow the JSON record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "Item")]
    pub item: ItemLabel,
    #[serde(rename = "Text")]
    pub text: String,
}

/// Turns an offset map into entries, in canonical label order.
///
/// Every located label yields exactly one entry. Labels whose trimmed text is
/// empty are still emitted and are also returned in the second vector so the
/// caller can surface them.
pub fn assemble_entries(
    identity: &FilingIdentity,
    text: &str,
    offsets: &OffsetMap,
) -> (Vec<Entry>, Vec<ItemLabel>) {
    let mut entries = Vec::with_capacity(offsets.len());
    let mut empty = Vec::new();

    for (label, span) in offsets.iter() {
        let body = span.slice(text).trim();
        if body.is_empty() {
            tracing::warn!(
                company = %identity.company,
                year = identity.fiscal_year,
                item = %label,
                "Missing text for {} - {} - {}",
                identity.company,
                identity.fiscal_year,
                label
            );
            empty.push(label);
        }
        entries.push(Entry {
            company: identity.company.clone(),
            year: identity.fiscal_year,
            item: label,
            text: body.to_string(),
        });
    }

    (entries, empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::scanner::{BoundaryScanner, ScanStrategy};

    fn identity() -> FilingIdentity {
        FilingIdentity::new("KO", 2005)
    }

    #[test]
    fn test_two_label_filing_splits_cleanly() {
        let text = "ITEM 1. Intro text. ITEM 2. More text.";
        let map = ScanStrategy::Legacy.scan(text);
        let (entries, empty) = assemble_entries(&identity(), text, &map);

        assert!(empty.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item, ItemLabel::Item1);
        assert_eq!(entries[0].text, "Intro text.");
        assert_eq!(entries[1].item, ItemLabel::Item2);
        assert_eq!(entries[1].text, "More text.");
        for entry in &entries {
            assert!(!entry.text.contains("ITEM"));
            assert_eq!(entry.company, "KO");
            assert_eq!(entry.year, 2005);
        }
    }

    #[test]
    fn test_empty_section_is_kept_and_flagged() {
        let text = "ITEM 1. Business here. ITEM 1A.   \n ITEM 2. Properties.";
        let map = ScanStrategy::Legacy.scan(text);
        let (entries, empty) = assemble_entries(&identity(), text, &map);

        assert_eq!(entries.len(), 3);
        assert_eq!(empty, vec![ItemLabel::Item1A]);
        assert_eq!(entries[1].text, "");
    }

    #[test]
    fn test_record_field_names() {
        let entry = Entry {
            company: "AAPL".to_string(),
            year: 1999,
            item: ItemLabel::Item7A,
            text: "Market risk".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Company": "AAPL", "Year": 1999, "Item": "ITEM 7A", "Text": "Market risk"})
        );
    }
}
