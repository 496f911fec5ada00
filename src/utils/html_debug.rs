// src/utils/html_debug.rs
use crate::extractors::OffsetMap;
use crate::utils::error::AppError;
use html_escape::encode_text;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A highlighted byte range of the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// One highlight per committed header occurrence.
pub fn header_highlights(offsets: &OffsetMap) -> Vec<Highlight> {
    offsets
        .iter()
        .map(|(label, span)| Highlight {
            start: span.header_start,
            end: span.start,
            label: label.to_string(),
        })
        .collect()
}

/// Renders plain text as an HTML page with the given ranges wrapped in spans.
/// Ranges are expected to be sorted-able and non-overlapping.
pub fn render_debug_html(text: &str, highlights: &[Highlight]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str("body { white-space: pre-wrap; font-family: monospace; }\n");
    debug_html.push_str(".highlight-item { background-color: #90EE90; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.start);

    let mut last_pos = 0;
    for h in sorted {
        if h.start < last_pos || h.end > text.len() {
            tracing::warn!("Skipping out-of-order highlight {} at {}-{}", h.label, h.start, h.end);
            continue;
        }
        debug_html.push_str(&encode_text(&text[last_pos..h.start]));
        debug_html.push_str(&format!(
            "<span class=\"highlight-item\" title=\"{} at {}-{}\">",
            encode_text(&h.label),
            h.start,
            h.end
        ));
        debug_html.push_str(&encode_text(&text[h.start..h.end]));
        debug_html.push_str("</span>");
        last_pos = h.end;
    }
    debug_html.push_str(&encode_text(&text[last_pos..]));
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Writes the annotated page for one scanned document.
pub fn save_debug_html(text: &str, offsets: &OffsetMap, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(render_debug_html(text, &header_highlights(offsets)).as_bytes())?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}
