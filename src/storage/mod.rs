// src/storage/mod.rs
use crate::batch::BatchSummary;
use crate::extractors::Entry;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes all entries as a row-oriented JSON array to `sec_items_{name}.json`.
    pub fn save_entries(&self, name: &str, entries: &[Entry]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("sec_items_{}.json", name));

        let json = serde_json::to_string(entries)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} entries to {}", entries.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves run counts and item coverage next to the entries file.
    pub fn save_batch_metadata(&self, name: &str, summary: &BatchSummary) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("sec_items_{}_meta.json", name));

        let metadata = serde_json::json!({
            "name": name,
            "entries": summary.entries.len(),
            "summary": summary,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}
