//! Forecast artifact handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use birr_core::{ForecastPoint, Scenario};

#[derive(Debug, Deserialize)]
pub struct ForecastsQuery {
    /// Filter to one scenario (base, optimistic, pessimistic)
    pub scenario: Option<String>,
}

/// GET /api/forecasts - the forecast table, optionally filtered by scenario
pub async fn list_forecasts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastsQuery>,
) -> Result<Json<Vec<ForecastPoint>>, AppError> {
    let Some(set) = state.forecasts.as_ref() else {
        return Err(AppError::not_found(
            "forecast artifacts not loaded; run 'birr forecast' and restart",
        ));
    };

    let scenario: Option<Scenario> = params
        .scenario
        .as_deref()
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let points: Vec<ForecastPoint> = set
        .points
        .iter()
        .filter(|p| scenario.map(|s| p.scenario == s).unwrap_or(true))
        .cloned()
        .collect();

    Ok(Json(points))
}
