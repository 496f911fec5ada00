// src/filing/locator.rs

// --- Imports ---
use crate::config::DuplicatePolicy;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

// --- Regex Patterns (Lazy Static) ---
// Tags in the submission wrapper are SGML-style and may be upper or lower case.
static DOCUMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<DOCUMENT>(.*?)(?:</DOCUMENT>|\z)")
        .expect("Failed to compile DOCUMENT_RE")
});

// <TYPE> is never closed; its value runs to the next tag or line break.
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<TYPE>([^<\r\n]*)").expect("Failed to compile TYPE_RE")
});

static TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<TEXT>(.*?)(?:</TEXT>|\z)").expect("Failed to compile TEXT_RE")
});

// --- CSS Selectors (Lazy Static) ---
static ANY_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("*").expect("Failed to compile ANY_ELEMENT_SELECTOR")
});

// --- Data Structures ---

/// One tagged unit inside a submission bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDocument<'a> {
    pub doc_type: &'a str,
    pub body: &'a str,
}

/// The located annual-report body, reduced to plain text.
#[derive(Debug, Clone)]
pub struct FilingDocument {
    /// Concatenated text nodes, entities decoded.
    pub text: String,
    /// Number of element nodes in the body; drives strategy selection.
    pub markup_count: usize,
}

/// Splits a raw bundle into its `<DOCUMENT>` units, in file order.
pub fn sub_documents(raw: &str) -> Vec<SubDocument<'_>> {
    DOCUMENT_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|doc| {
            let doc = doc.as_str();
            let type_match = TYPE_RE.captures(doc).and_then(|c| c.get(1));
            let doc_type = type_match.map(|m| m.as_str().trim()).unwrap_or("");
            let body = match TEXT_RE.captures(doc).and_then(|c| c.get(1)) {
                Some(text) => text.as_str(),
                // No <TEXT> wrapper: everything after the type declaration.
                None => type_match.map(|m| &doc[m.end()..]).unwrap_or(doc),
            };
            SubDocument { doc_type, body }
        })
        .collect()
}

/// Returns the body of the sub-document declaring `form_type`.
///
/// When several sub-documents declare the same type the `policy` decides;
/// filings observed so far put the authoritative body last, so callers
/// normally pass `DuplicatePolicy::KeepLast`.
pub fn find_form_body<'a>(
    raw: &'a str,
    form_type: &str,
    policy: DuplicatePolicy,
) -> Result<&'a str, ExtractError> {
    let mut matching = sub_documents(raw)
        .into_iter()
        .filter(|doc| doc.doc_type == form_type);

    let chosen = match policy {
        DuplicatePolicy::KeepFirst => matching.next(),
        DuplicatePolicy::KeepLast => matching.last(),
    };

    chosen
        .map(|doc| doc.body)
        .ok_or_else(|| ExtractError::NoMatchingDocument(form_type.to_string()))
}

impl FilingDocument {
    /// Parses a sub-document body as an HTML fragment, counting elements and
    /// flattening all text nodes. Legacy plain-text bodies come through
    /// nearly unchanged apart from entity decoding.
    pub fn from_body(body: &str) -> Self {
        let fragment = Html::parse_fragment(body);
        // The fragment parser wraps everything in a synthetic <html> root.
        let markup_count = fragment.select(&ANY_ELEMENT_SELECTOR).count().saturating_sub(1);
        let text = fragment.root_element().text().collect::<String>();
        tracing::trace!("Converted body ({} bytes) to {} bytes of text, {} elements", body.len(), text.len(), markup_count);
        Self { text, markup_count }
    }
}

/// Locator entry point: raw bundle in, plain-text annual report out.
pub fn locate_filing_document(
    raw: &str,
    form_type: &str,
    policy: DuplicatePolicy,
) -> Result<FilingDocument, ExtractError> {
    let body = find_form_body(raw, form_type, policy)?;
    Ok(FilingDocument::from_body(body))
}
