//! birr Core Library
//!
//! Shared functionality for the Ethiopia financial-inclusion analysis
//! toolkit:
//! - Unified dataset store (flat CSV, one schema over four record kinds)
//! - Schema validation with per-row errors and data-quality warnings
//! - Enrichment (append-only, idempotent, with a human-readable change log)
//! - Exploratory analysis (coverage, trends, event overlay)
//! - Lagged event-impact features
//! - Scenario forecasts for the Access and Usage headline indicators

pub mod analysis;
pub mod config;
pub mod enrich;
pub mod error;
pub mod forecast;
pub mod impact;
pub mod models;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use analysis::{
    coverage, event_overlay, indicator_series, latest_value, summarize, CoverageGap,
    CoverageMatrix, DatasetSummary, LinkedImpact, TrendPoint,
};
pub use config::{ForecastConfig, ScenarioParams};
pub use enrich::{enrich, render_change_log, EnrichmentReport, RejectedRow};
pub use error::{Error, Result};
pub use forecast::{run_forecast, ForecastPoint, ForecastSet};
pub use impact::{build_event_features, event_indicator_matrix, EventFeatures, EventIndicatorMatrix};
pub use models::{Event, ImpactLink, Observation, Pillar, Record, RecordType, Scenario, Target};
pub use store::{Dataset, COLUMNS};
pub use validate::{validate, RowIssue, ValidationReport};
