//! Dashboard server command

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use birr_core::ForecastSet;

use super::{forecast_long_path, load_dataset};

pub async fn cmd_serve(
    data_dir: &Path,
    host: &str,
    port: u16,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    // The dataset is required; forecasts are an optional artifact
    let ds = load_dataset(data_dir)?;

    let forecast_file = forecast_long_path(data_dir);
    let forecasts = if forecast_file.exists() {
        let set = ForecastSet::from_path(&forecast_file)?;
        info!(
            "Loaded {} forecast points from {}",
            set.points.len(),
            forecast_file.display()
        );
        Some(set)
    } else {
        None
    };

    let static_dir = static_dir.as_deref().and_then(|p| p.to_str().map(String::from));

    birr_server::serve(ds, forecasts, host, port, static_dir.as_deref()).await
}
