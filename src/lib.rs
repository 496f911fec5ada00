// src/lib.rs
//! Splits annual-report (10-K) submission bundles into their twenty
//! standardized items.
//!
//! Pipeline per filing: locate the 10-K sub-document, reduce it to plain
//! text, pick a boundary-scanning strategy from its markup density, scan the
//! item headers in canonical order, and assemble one entry per located item.

pub mod batch;
pub mod config;
pub mod extractors;
pub mod filing;
pub mod storage;
pub mod utils;

pub use config::ExtractorConfig;
pub use extractors::{Entry, FilingReport, ItemExtractor, ItemLabel};
pub use filing::FilingIdentity;
