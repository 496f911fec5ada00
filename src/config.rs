// src/config.rs
use serde::Serialize;

pub const DEFAULT_FORM_TYPE: &str = "10-K";
/// Bodies with more elements than this are scanned with the HTML strategy.
pub const DEFAULT_MARKUP_THRESHOLD: usize = 500;
/// Minimum distance, in characters, between consecutive committed headers
/// under the HTML strategy.
pub const DEFAULT_PROXIMITY_THRESHOLD: usize = 100;

pub const MARKUP_THRESHOLD_ENV: &str = "MARKUP_TAG_THRESHOLD";
pub const PROXIMITY_THRESHOLD_ENV: &str = "ITEM_PROXIMITY_THRESHOLD";

/// Which sub-document wins when a bundle declares the target type more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuplicatePolicy {
    KeepFirst,
    KeepLast,
}

/// A filing skipped outright, e.g. one known to be corrupt upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedFiling {
    pub company: String,
    pub fiscal_year: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractorConfig {
    pub target_form: String,
    pub markup_threshold: usize,
    pub proximity_threshold: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub excluded: Vec<ExcludedFiling>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            target_form: DEFAULT_FORM_TYPE.to_string(),
            markup_threshold: DEFAULT_MARKUP_THRESHOLD,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            duplicate_policy: DuplicatePolicy::KeepLast,
            // The 2020 INTC submission does not parse into usable items.
            excluded: vec![ExcludedFiling { company: "INTC".to_string(), fiscal_year: 2020 }],
        }
    }
}

impl ExtractorConfig {
    /// Defaults, with numeric thresholds overridden from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = read_usize_env(MARKUP_THRESHOLD_ENV) {
            config.markup_threshold = v;
        }
        if let Some(v) = read_usize_env(PROXIMITY_THRESHOLD_ENV) {
            config.proximity_threshold = v;
        }
        config
    }

    pub fn is_excluded(&self, company: &str, fiscal_year: u32) -> bool {
        self.excluded
            .iter()
            .any(|e| e.company.eq_ignore_ascii_case(company) && e.fiscal_year == fiscal_year)
    }
}

fn read_usize_env(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) => {
            tracing::debug!("Using {}={} from environment", key, v);
            Some(v)
        }
        Err(_) => {
            tracing::warn!("Ignoring invalid {} value: {:?}", key, raw);
            None
        }
    }
}
