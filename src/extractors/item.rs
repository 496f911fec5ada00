// src/extractors/item.rs

// --- Imports ---
use super::entry::{assemble_entries, Entry};
use super::patterns::ItemLabel;
use super::scanner::{BoundaryScanner, OffsetMap, ScanStrategy};
use crate::config::ExtractorConfig;
use crate::filing::{locate_filing_document, FilingDocument, FilingIdentity};
use crate::utils::error::ExtractError;
use std::path::Path;

// --- Data Structures ---

/// Everything learned about one filing. An empty `entries` list means the
/// filing contributed nothing, whatever the reason.
#[derive(Debug, Clone)]
pub struct FilingReport {
    pub identity: FilingIdentity,
    /// `None` when the filing was skipped before scanning.
    pub strategy: Option<ScanStrategy>,
    pub entries: Vec<Entry>,
    /// Labels with no surviving header occurrence.
    pub missing_items: Vec<ItemLabel>,
    /// Labels located but with no text between their header and the next.
    pub empty_items: Vec<ItemLabel>,
    pub excluded: bool,
}

impl FilingReport {
    fn excluded(identity: FilingIdentity) -> Self {
        Self {
            identity,
            strategy: None,
            entries: Vec::new(),
            missing_items: Vec::new(),
            empty_items: Vec::new(),
            excluded: true,
        }
    }
}

/// A scanned document kept around for debug output.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub document: FilingDocument,
    pub strategy: ScanStrategy,
    pub offsets: OffsetMap,
}

/// Runs locate -> classify -> scan -> assemble for single filings.
/// Holds no mutable state, so one instance can serve every worker.
#[derive(Debug, Clone, Default)]
pub struct ItemExtractor {
    config: ExtractorConfig,
}

impl ItemExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Locates the target sub-document and computes item offsets.
    pub fn scan_bundle(&self, raw: &str) -> Result<ScannedDocument, ExtractError> {
        let document = locate_filing_document(raw, &self.config.target_form, self.config.duplicate_policy)?;
        let strategy = ScanStrategy::classify(
            document.markup_count,
            self.config.markup_threshold,
            self.config.proximity_threshold,
        );
        tracing::debug!(
            markup = document.markup_count,
            text_len = document.text.len(),
            strategy = %strategy,
            "Classified filing document"
        );
        let offsets = strategy.scan(&document.text);
        Ok(ScannedDocument { document, strategy, offsets })
    }

    /// Extracts all locatable items from a raw bundle.
    pub fn extract(&self, identity: FilingIdentity, raw: &str) -> Result<FilingReport, ExtractError> {
        if self.config.is_excluded(&identity.company, identity.fiscal_year) {
            tracing::warn!(company = %identity.company, year = identity.fiscal_year, "Filing excluded by policy, skipping");
            return Ok(FilingReport::excluded(identity));
        }
        let scanned = self.scan_bundle(raw)?;
        Ok(self.report(identity, &scanned))
    }

    /// Builds the report for an already scanned document.
    pub fn report(&self, identity: FilingIdentity, scanned: &ScannedDocument) -> FilingReport {
        let (entries, empty_items) = assemble_entries(&identity, &scanned.document.text, &scanned.offsets);
        let missing_items = scanned.offsets.missing();

        tracing::info!(
            company = %identity.company,
            year = identity.fiscal_year,
            strategy = %scanned.strategy,
            entries = entries.len(),
            missing = missing_items.len(),
            "Extracted items"
        );

        FilingReport {
            identity,
            strategy: Some(scanned.strategy),
            entries,
            missing_items,
            empty_items,
            excluded: false,
        }
    }

    /// Reads and extracts one filing from disk, deriving its identity from the path.
    pub fn extract_path(&self, path: &Path) -> Result<FilingReport, ExtractError> {
        let identity = FilingIdentity::from_path(path)?;
        if self.config.is_excluded(&identity.company, identity.fiscal_year) {
            return self.extract(identity, "");
        }
        let raw = read_filing(path)?;
        self.extract(identity, &raw)
    }
}

/// Reads a filing as text. Stray non-UTF-8 bytes are replaced rather than
/// failing the whole filing.
pub fn read_filing(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
