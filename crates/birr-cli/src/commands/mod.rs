//! Command implementations

mod analysis;
mod enrich;
mod forecast;
mod serve;
mod validate;

pub use analysis::{cmd_coverage, cmd_events, cmd_status, cmd_trends};
pub use enrich::cmd_enrich;
pub use forecast::{cmd_forecast, cmd_impact};
pub use serve::cmd_serve;
pub use validate::cmd_validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use birr_core::Dataset;

pub fn raw_path(data_dir: &Path) -> PathBuf {
    data_dir.join("raw").join("ethiopia_fi_unified_data.csv")
}

pub fn default_additions_path(data_dir: &Path) -> PathBuf {
    data_dir.join("raw").join("additions_2025.csv")
}

pub fn processed_path(data_dir: &Path) -> PathBuf {
    data_dir
        .join("processed")
        .join("ethiopia_fi_unified_data_enriched.csv")
}

pub fn change_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join("enrichment_log.txt")
}

pub fn features_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join("event_features.csv")
}

pub fn matrix_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join("event_indicator_matrix.csv")
}

pub fn forecast_long_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join("forecast_2025_2027.csv")
}

pub fn forecast_wide_path(data_dir: &Path) -> PathBuf {
    data_dir.join("processed").join("forecast_2025_2027_wide.csv")
}

/// Load the dataset for analysis: the enriched processed file when it
/// exists, the raw file otherwise. A missing raw file is a hard error.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    let processed = processed_path(data_dir);
    if processed.exists() {
        return Dataset::from_path(&processed)
            .with_context(|| format!("failed to read {}", processed.display()));
    }

    let raw = raw_path(data_dir);
    warn!(
        "Processed dataset not found; falling back to raw file {}",
        raw.display()
    );
    Dataset::from_path(&raw).with_context(|| format!("failed to read {}", raw.display()))
}
