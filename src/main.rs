// src/main.rs
use clap::Parser;
use sec_item_parser::batch::{self, DEFAULT_CONCURRENCY};
use sec_item_parser::storage::StorageManager;
use sec_item_parser::utils::{self, AppError};
use sec_item_parser::{ExtractorConfig, ItemExtractor};
use std::path::PathBuf;
use std::sync::Arc;

/// Command Line Interface for the 10-K item parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root of the downloaded filings (<root>/<TICKER>/10-K/<accession>/*.txt)
    #[arg(short, long, default_value = "sec-edgar-filings")]
    input_dir: PathBuf,

    /// Only process filings of this ticker
    #[arg(short, long)]
    ticker: Option<String>,

    /// Output directory for extracted items
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Maximum number of filings processed at once
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Element count above which a filing is scanned as modern HTML
    #[arg(long)]
    markup_threshold: Option<usize>,

    /// Minimum distance in characters between consecutive item headers (HTML filings)
    #[arg(long)]
    proximity_threshold: Option<usize>,

    /// Debug mode - save header-annotated text for every filing
    #[arg(short, long)]
    debug: bool,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments, then set up logging (reads RUST_LOG env var)
    let args = Args::parse();
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting processing for args: {:?}", args);

    // 2. Build configuration: defaults, environment, then CLI flags
    let mut config = ExtractorConfig::from_env();
    if let Some(threshold) = args.markup_threshold {
        config.markup_threshold = threshold;
    }
    if let Some(threshold) = args.proximity_threshold {
        config.proximity_threshold = threshold;
    }
    tracing::debug!("Extractor configuration: {:?}", config);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Find filings
    let paths = batch::discover_filings(&args.input_dir, args.ticker.as_deref())?;
    if paths.is_empty() {
        return Err(AppError::Config(format!(
            "No filings found under {}",
            args.input_dir.display()
        )));
    }

    // 5. Process every filing
    let debug_dir = args.debug.then(|| storage.base_dir().join("debug"));
    let extractor = Arc::new(ItemExtractor::new(config));
    let summary = batch::run_batch(paths, extractor, args.concurrency, debug_dir).await;

    // 6. Persist results
    let name = args
        .ticker
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "all".to_string());
    storage.save_entries(&name, &summary.entries)?;
    storage.save_batch_metadata(&name, &summary)?;

    tracing::info!(
        "Processing finished. Filings with items: {}, without: {}, failed: {}",
        summary.filings_with_entries,
        summary.filings_without_entries,
        summary.filings_failed
    );

    if summary.filings_with_entries == 0 {
        return Err(AppError::Processing(format!(
            "No items extracted from {} filings",
            summary.filings_total
        )));
    }

    Ok(())
}
