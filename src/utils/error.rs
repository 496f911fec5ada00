// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No sub-document of type {0} found in filing")]
    NoMatchingDocument(String),

    #[error("Could not read filing {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Filing path does not follow <company>/<form>/<accession>/<file>: {0}")]
    InvalidFilingPath(String),
}

impl ExtractError {
    /// Both failure kinds a batch run is expected to shrug off.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::NoMatchingDocument(_) | ExtractError::UnreadableFile { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
