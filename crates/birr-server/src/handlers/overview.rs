//! Dashboard overview handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{AppError, AppState};
use birr_core::{latest_value, summarize, DatasetSummary, Pillar, Scenario};

/// Latest observed value of one indicator
#[derive(Debug, Serialize)]
pub struct IndicatorSnapshot {
    pub indicator: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Headline forecast against the policy target
#[derive(Debug, Serialize)]
pub struct HeadlineForecast {
    pub indicator: String,
    pub year: i32,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    /// NFIS-II target for the indicator, if one is recorded
    pub target: Option<f64>,
    /// target - forecast; positive means the target is missed
    pub target_gap: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub summary: DatasetSummary,
    pub latest_access: Option<IndicatorSnapshot>,
    pub latest_usage: Option<IndicatorSnapshot>,
    pub headline_forecast: Option<HeadlineForecast>,
}

/// GET /api/overview - dataset summary, latest headline values, and the
/// end-of-horizon Access forecast against its target
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverviewResponse>, AppError> {
    let ds = &state.dataset;

    let snapshot = |pillar: Pillar| {
        let code = pillar.headline_indicator();
        latest_value(ds, code).map(|point| IndicatorSnapshot {
            indicator: code.to_string(),
            date: point.date,
            value: point.value,
        })
    };

    let headline_forecast = state.forecasts.as_ref().and_then(|set| {
        let code = Pillar::Access.headline_indicator();
        let year = set
            .points
            .iter()
            .filter(|p| p.indicator == code)
            .map(|p| p.year)
            .max()?;
        let point = set.get(code, year, Scenario::Base)?;

        // Most recently dated target wins if several are recorded
        let target = ds
            .targets()
            .into_iter()
            .filter(|t| t.indicator == code)
            .max_by_key(|t| t.target_date)
            .map(|t| t.target_value);

        Some(HeadlineForecast {
            indicator: code.to_string(),
            year,
            value: point.value,
            lower: point.lower,
            upper: point.upper,
            target,
            target_gap: target.map(|t| t - point.value),
        })
    });

    Ok(Json(OverviewResponse {
        summary: summarize(ds),
        latest_access: snapshot(Pillar::Access),
        latest_usage: snapshot(Pillar::Usage),
        headline_forecast,
    }))
}
