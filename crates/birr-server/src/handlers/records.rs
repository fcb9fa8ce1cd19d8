//! Raw record listing

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use birr_core::{Record, RecordType};

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    /// Filter to one record kind (observation, event, impact_link, target)
    pub record_type: Option<String>,
    /// Filter to one indicator code
    pub indicator: Option<String>,
}

/// GET /api/records - the unified dataset, optionally filtered
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordsQuery>,
) -> Result<Json<Vec<Record>>, AppError> {
    let kind: Option<RecordType> = params
        .record_type
        .as_deref()
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let records: Vec<Record> = state
        .dataset
        .records()
        .iter()
        .filter(|rec| match kind {
            Some(kind) => rec.kind().map(|k| k == kind).unwrap_or(false),
            None => true,
        })
        .filter(|rec| match params.indicator.as_deref() {
            Some(code) => rec.indicator.as_deref() == Some(code),
            None => true,
        })
        .cloned()
        .collect();

    Ok(Json(records))
}
