//! Validation command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use birr_core::{validate, Dataset};

use super::load_dataset;

pub fn cmd_validate(data_dir: &Path, file: Option<PathBuf>) -> Result<()> {
    let ds = match file {
        Some(path) => Dataset::from_path(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => load_dataset(data_dir)?,
    };

    println!("🔍 Validating {} records...", ds.len());

    let report = validate(&ds);

    for issue in &report.errors {
        println!("   ✗ line {} ({}): {}", issue.line, issue.id, issue.message);
    }
    for issue in &report.warnings {
        println!("   ~ line {} ({}): {}", issue.line, issue.id, issue.message);
    }

    if report.is_clean() {
        println!(
            "✅ Schema valid ({} warnings)",
            report.warnings.len()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "validation failed: {} errors, {} warnings",
            report.errors.len(),
            report.warnings.len()
        )
    }
}
