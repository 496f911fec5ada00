// src/extractors/mod.rs
pub mod entry;
pub mod item;
pub mod patterns;
pub mod scanner;

// Re-export key extraction types for convenience
pub use entry::{assemble_entries, Entry};
pub use item::{read_filing, FilingReport, ItemExtractor, ScannedDocument};
pub use patterns::{header_patterns, HeaderMatch, HeaderPattern, ItemLabel, ITEMS_10K};
pub use scanner::{BoundaryScanner, OffsetMap, OffsetSpan, ScanState, ScanStrategy};
