//! Impact-artifact and forecast commands

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use birr_core::{
    build_event_features, event_indicator_matrix, event_overlay, run_forecast, ForecastConfig,
    Scenario,
};

use super::{features_path, forecast_long_path, forecast_wide_path, load_dataset, matrix_path};

pub fn cmd_impact(data_dir: &Path, out_dir: Option<PathBuf>) -> Result<()> {
    let ds = load_dataset(data_dir)?;
    let overlay = event_overlay(&ds)?;
    let cfg = ForecastConfig::default();

    let earliest = ds
        .observations()
        .iter()
        .map(|o| o.date)
        .min()
        .context("dataset has no observations")?;
    let end = NaiveDate::from_ymd_opt(cfg.horizon_end, 12, 1)
        .context("invalid horizon end year")?;

    let features = build_event_features(&overlay, earliest, end);
    let matrix = event_indicator_matrix(&overlay);

    let (features_file, matrix_file) = match out_dir {
        Some(dir) => (
            dir.join("event_features.csv"),
            dir.join("event_indicator_matrix.csv"),
        ),
        None => (features_path(data_dir), matrix_path(data_dir)),
    };

    if let Some(parent) = features_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    features.write_csv(File::create(&features_file)?)?;
    matrix.write_csv(File::create(&matrix_file)?)?;

    println!("✅ Impact artifacts written");
    println!(
        "   {} ({} months x {} indicators)",
        features_file.display(),
        features.months.len(),
        features.indicators.len()
    );
    println!(
        "   {} ({} events x {} indicators)",
        matrix_file.display(),
        matrix.events.len(),
        matrix.indicators.len()
    );

    Ok(())
}

pub fn cmd_forecast(
    data_dir: &Path,
    scenario: Option<String>,
    config: Option<PathBuf>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let scenario_filter: Option<Scenario> = scenario
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let ds = load_dataset(data_dir)?;
    let cfg = ForecastConfig::load(config.as_deref())?;

    println!(
        "🔮 Forecasting {}-{}...",
        cfg.horizon_start, cfg.horizon_end
    );

    let set = run_forecast(&ds, &cfg)?;

    let (long_file, wide_file) = match out_dir {
        Some(dir) => (
            dir.join("forecast_2025_2027.csv"),
            dir.join("forecast_2025_2027_wide.csv"),
        ),
        None => (forecast_long_path(data_dir), forecast_wide_path(data_dir)),
    };

    if let Some(parent) = long_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    set.write_long_csv(File::create(&long_file)?)?;
    set.write_wide_csv(File::create(&wide_file)?)?;

    for indicator in set.indicators() {
        println!();
        println!("   {}", indicator);
        for point in set
            .points
            .iter()
            .filter(|p| p.indicator == indicator)
            .filter(|p| scenario_filter.map(|s| p.scenario == s).unwrap_or(true))
        {
            println!(
                "   {}  {:12}  {:5.1}%  [{:.1}, {:.1}]",
                point.year,
                point.scenario.as_str(),
                point.value,
                point.lower,
                point.upper
            );
        }
    }

    println!();
    println!("✅ Forecast artifacts written");
    println!("   {}", long_file.display());
    println!("   {}", wide_file.display());

    Ok(())
}
