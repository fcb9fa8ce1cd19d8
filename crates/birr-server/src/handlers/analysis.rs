//! Coverage, trend, and event-overlay handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState};
use birr_core::{
    coverage, event_overlay, indicator_series, CoverageGap, ForecastPoint, LinkedImpact, Target,
    TrendPoint,
};

#[derive(Debug, Serialize)]
pub struct CoverageResponse {
    pub indicators: Vec<String>,
    pub years: Vec<i32>,
    pub counts: Vec<Vec<u32>>,
    pub gaps: Vec<CoverageGap>,
}

/// GET /api/coverage - indicator x year observation counts with gaps
pub async fn get_coverage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CoverageResponse>, AppError> {
    let matrix = coverage(&state.dataset);
    let gaps = matrix.gaps();

    Ok(Json(CoverageResponse {
        indicators: matrix.indicators,
        years: matrix.years,
        counts: matrix.counts,
        gaps,
    }))
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub indicator: String,
    pub series: Vec<TrendPoint>,
    pub targets: Vec<Target>,
    /// Present when forecast artifacts are loaded
    pub forecasts: Vec<ForecastPoint>,
}

/// GET /api/trends/:indicator - observed series plus targets and forecasts
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    Path(indicator): Path<String>,
) -> Result<Json<TrendsResponse>, AppError> {
    let series = indicator_series(&state.dataset, &indicator);
    if series.is_empty() {
        return Err(AppError::not_found(&format!(
            "no observations for indicator '{}'",
            indicator
        )));
    }

    let targets = state
        .dataset
        .targets()
        .into_iter()
        .filter(|t| t.indicator == indicator)
        .collect();

    let forecasts = state
        .forecasts
        .as_ref()
        .map(|set| {
            set.points
                .iter()
                .filter(|p| p.indicator == indicator)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(TrendsResponse {
        indicator,
        series,
        targets,
        forecasts,
    }))
}

/// GET /api/events - impact links joined to their events and indicators
pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinkedImpact>>, AppError> {
    let overlay = event_overlay(&state.dataset)?;
    Ok(Json(overlay))
}

/// GET /api/targets - recorded policy targets
pub async fn list_targets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Target>>, AppError> {
    Ok(Json(state.dataset.targets()))
}
