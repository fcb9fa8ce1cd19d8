//! Enrichment command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use birr_core::{enrich, render_change_log, Dataset};

use super::{change_log_path, default_additions_path, processed_path, raw_path};

pub fn cmd_enrich(
    data_dir: &Path,
    raw: Option<PathBuf>,
    additions: Option<PathBuf>,
    out: Option<PathBuf>,
    log: Option<PathBuf>,
) -> Result<()> {
    let raw_file = raw.unwrap_or_else(|| raw_path(data_dir));
    let out_file = out.unwrap_or_else(|| processed_path(data_dir));
    let log_file = log.unwrap_or_else(|| change_log_path(data_dir));

    let raw_ds = Dataset::from_path(&raw_file)
        .with_context(|| format!("failed to read raw dataset {}", raw_file.display()))?;

    // An explicitly named additions file must exist; the default one is
    // optional so a plain `birr enrich` works on a fresh checkout.
    let additions_ds = match additions {
        Some(path) => Dataset::from_path(&path)
            .with_context(|| format!("failed to read additions {}", path.display()))?,
        None => {
            let default = default_additions_path(data_dir);
            if default.exists() {
                Dataset::from_path(&default)
                    .with_context(|| format!("failed to read additions {}", default.display()))?
            } else {
                Dataset::default()
            }
        }
    };

    println!(
        "📥 Enriching {} ({} raw rows, {} additions)...",
        raw_file.display(),
        raw_ds.len(),
        additions_ds.len()
    );

    let (processed, report) = enrich(&raw_ds, &additions_ds);

    processed
        .to_path(&out_file)
        .with_context(|| format!("failed to write {}", out_file.display()))?;

    let raw_name = raw_file.display().to_string();
    let out_name = out_file.display().to_string();
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&log_file, render_change_log(&report, &raw_name, &out_name))
        .with_context(|| format!("failed to write {}", log_file.display()))?;

    println!("✅ Enrichment complete!");
    println!("   Appended: {}", report.appended);
    println!("   Skipped (duplicates): {}", report.skipped_duplicates);

    if !report.rejected.is_empty() {
        println!("   Rejected: {}", report.rejected.len());
        for rejected in &report.rejected {
            println!("   ! line {} ({})", rejected.line, rejected.id);
            for reason in &rejected.reasons {
                println!("       - {}", reason);
            }
        }
    }
    if !report.warnings.is_empty() {
        println!("   Warnings: {}", report.warnings.len());
        for warning in &report.warnings {
            println!("   ~ {} ({})", warning.message, warning.id);
        }
    }

    println!("   Processed file: {}", out_file.display());
    println!("   Change log: {}", log_file.display());

    Ok(())
}
