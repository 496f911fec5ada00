// src/batch.rs

// --- Imports ---
use crate::extractors::{read_filing, Entry, FilingReport, ItemExtractor, ItemLabel};
use crate::filing::FilingIdentity;
use crate::utils::error::{AppError, ExtractError};
use crate::utils::html_debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};

pub const DEFAULT_CONCURRENCY: usize = 8;

// --- Data Structures ---

/// Result of one filing, as delivered to the collector.
#[derive(Debug)]
pub struct FilingOutcome {
    pub index: usize,
    pub path: PathBuf,
    pub result: Result<FilingReport, ExtractError>,
    pub processing_time: Duration,
}

/// Aggregate of a whole run. Entries keep input path order.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    #[serde(skip)]
    pub entries: Vec<Entry>,
    pub filings_total: usize,
    pub filings_with_entries: usize,
    pub filings_without_entries: usize,
    pub filings_failed: usize,
    pub filings_excluded: usize,
    pub empty_sections: usize,
    /// How many filings each item was located in.
    pub item_coverage: BTreeMap<String, usize>,
}

impl BatchSummary {
    fn record(&mut self, outcome: FilingOutcome) {
        self.filings_total += 1;
        match outcome.result {
            Ok(report) => {
                if report.excluded {
                    self.filings_excluded += 1;
                }
                if report.entries.is_empty() {
                    self.filings_without_entries += 1;
                } else {
                    self.filings_with_entries += 1;
                }
                self.empty_sections += report.empty_items.len();
                for entry in &report.entries {
                    *self.item_coverage.entry(entry.item.to_string()).or_default() += 1;
                }
                self.entries.extend(report.entries);
            }
            Err(e) => {
                // A failed filing contributes no entries; the batch carries on.
                tracing::warn!("Skipping {}: {}", outcome.path.display(), e);
                self.filings_failed += 1;
                self.filings_without_entries += 1;
            }
        }
    }

    pub fn coverage(&self, item: ItemLabel) -> usize {
        self.item_coverage.get(item.as_str()).copied().unwrap_or(0)
    }
}

/// Finds every `*.txt` filing under `input_dir`, or under
/// `input_dir/<TICKER>` when a ticker is given. Sorted for stable output.
pub fn discover_filings(input_dir: &Path, ticker: Option<&str>) -> Result<Vec<PathBuf>, AppError> {
    let root = match ticker {
        Some(t) => input_dir.join(t.to_uppercase()),
        None => input_dir.to_path_buf(),
    };
    if !root.is_dir() {
        return Err(AppError::Config(format!("Input directory {} does not exist", root.display())));
    }

    let pattern = root.join("**").join("*.txt");
    let pattern_str = pattern.to_string_lossy();
    let matches = glob::glob(&pattern_str)
        .map_err(|e| AppError::Config(format!("Invalid glob pattern {}: {}", pattern_str, e)))?;

    let mut paths = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    paths.sort();
    tracing::info!("Discovered {} filings under {}", paths.len(), root.display());
    Ok(paths)
}

/// Full per-filing pipeline, run on a blocking worker. Writes the
/// header-annotated text when `debug_dir` is set.
pub fn process_filing(
    extractor: &ItemExtractor,
    path: &Path,
    debug_dir: Option<&Path>,
) -> Result<FilingReport, ExtractError> {
    let Some(debug_dir) = debug_dir else {
        return extractor.extract_path(path);
    };

    let identity = FilingIdentity::from_path(path)?;
    if extractor.config().is_excluded(&identity.company, identity.fiscal_year) {
        return extractor.extract(identity, "");
    }
    let raw = read_filing(path)?;
    let scanned = extractor.scan_bundle(&raw)?;

    let debug_path = debug_dir
        .join(&identity.company)
        .join(format!("{}_{}_items.html", identity.company, identity.fiscal_year));
    if let Err(e) = html_debug::save_debug_html(&scanned.document.text, &scanned.offsets, &debug_path) {
        tracing::warn!("Failed to write debug HTML for {}: {}", path.display(), e);
    }
    Ok(extractor.report(identity, &scanned))
}

/// Processes all filings with at most `concurrency` in flight. Workers send
/// their outcomes over a channel to this task, the only writer of the summary.
pub async fn run_batch(
    paths: Vec<PathBuf>,
    extractor: Arc<ItemExtractor>,
    concurrency: usize,
    debug_dir: Option<PathBuf>,
) -> BatchSummary {
    let concurrency = concurrency.max(1);
    let (tx, mut rx) = mpsc::channel::<FilingOutcome>(concurrency * 2);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    tracing::info!("Processing {} filings with concurrency {}", paths.len(), concurrency);

    for (index, path) in paths.into_iter().enumerate() {
        let tx = tx.clone();
        let semaphore = semaphore.clone();
        let extractor = extractor.clone();
        let debug_dir = debug_dir.clone();

        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let start_time = Instant::now();

            let worker_path = path.clone();
            let joined = tokio::task::spawn_blocking(move || {
                process_filing(&extractor, &worker_path, debug_dir.as_deref())
            })
            .await;

            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Worker for {} panicked: {}", path.display(), e);
                    Err(ExtractError::UnreadableFile {
                        path: path.clone(),
                        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                    })
                }
            };

            let _ = tx
                .send(FilingOutcome {
                    index,
                    path,
                    result,
                    processing_time: start_time.elapsed(),
                })
                .await;
        });
    }
    // Only worker clones remain; the channel closes when the last one finishes.
    drop(tx);

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        tracing::debug!(
            "Finished {} in {:?}",
            outcome.path.display(),
            outcome.processing_time
        );
        outcomes.push(outcome);
    }
    outcomes.sort_by_key(|o| o.index);

    let mut summary = BatchSummary::default();
    for outcome in outcomes {
        summary.record(outcome);
    }
    tracing::info!(
        "Batch finished. Total: {}, with entries: {}, failed: {}, entries: {}",
        summary.filings_total,
        summary.filings_with_entries,
        summary.filings_failed,
        summary.entries.len()
    );
    summary
}
