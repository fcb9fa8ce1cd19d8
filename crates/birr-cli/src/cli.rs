//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// birr - Ethiopia financial-inclusion data and forecasting toolkit
#[derive(Parser)]
#[command(name = "birr")]
#[command(about = "Validate, enrich, analyze, and forecast financial-inclusion data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory holding raw/ and processed/
    #[arg(long, default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate additions and write the processed dataset plus a change log
    Enrich {
        /// Raw dataset (defaults to <data-dir>/raw/ethiopia_fi_unified_data.csv)
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Additions to append (defaults to <data-dir>/raw/additions_2025.csv
        /// when that file exists)
        #[arg(long)]
        additions: Option<PathBuf>,

        /// Processed output path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Change log output path
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Check a dataset for schema errors and data-quality warnings
    Validate {
        /// Dataset to check (defaults to the processed file, then raw)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show dataset summary
    Status,

    /// Show the indicator x year coverage matrix and its gaps
    Coverage,

    /// Show indicator trend series
    Trends {
        /// Indicator code (defaults to both headline indicators)
        #[arg(short, long)]
        indicator: Option<String>,
    },

    /// Show impact links joined to their events and indicators
    Events,

    /// Write event-feature and event-indicator-matrix artifacts
    Impact {
        /// Output directory (defaults to <data-dir>/processed)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Fit forecasts and write the 2025-2027 artifacts
    Forecast {
        /// Show only one scenario in the printed table
        #[arg(short, long)]
        scenario: Option<String>,

        /// Scenario config override (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (defaults to <data-dir>/processed)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Start the dashboard server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static dashboard files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
