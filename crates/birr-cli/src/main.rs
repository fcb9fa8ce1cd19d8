//! birr CLI - Ethiopia financial-inclusion data toolkit
//!
//! Usage:
//!   birr enrich               Validate additions, write the processed CSV
//!   birr validate             Check the dataset for schema errors
//!   birr coverage             Show the indicator x year coverage matrix
//!   birr forecast             Fit the 2025-2027 scenario forecasts
//!   birr serve --port 3000    Start the dashboard server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Enrich {
            raw,
            additions,
            out,
            log,
        } => commands::cmd_enrich(&cli.data_dir, raw, additions, out, log),
        Commands::Validate { file } => commands::cmd_validate(&cli.data_dir, file),
        Commands::Status => commands::cmd_status(&cli.data_dir),
        Commands::Coverage => commands::cmd_coverage(&cli.data_dir),
        Commands::Trends { indicator } => commands::cmd_trends(&cli.data_dir, indicator),
        Commands::Events => commands::cmd_events(&cli.data_dir),
        Commands::Impact { out_dir } => commands::cmd_impact(&cli.data_dir, out_dir),
        Commands::Forecast {
            scenario,
            config,
            out_dir,
        } => commands::cmd_forecast(&cli.data_dir, scenario, config, out_dir),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.data_dir, &host, port, static_dir).await,
    }
}
