//! birr Dashboard Server
//!
//! Axum-based read-only REST API over the processed dataset and forecast
//! artifacts. The server never mutates data; regenerating the processed file
//! or the forecasts happens through the CLI, after which a restart picks the
//! new artifacts up.

use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::{Any, CorsLayer}, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use birr_core::{Dataset, ForecastSet};

mod handlers;

#[cfg(test)]
mod tests;

/// Shared application state
pub struct AppState {
    pub dataset: Dataset,
    /// Forecast artifacts are optional: the forecast endpoints report their
    /// absence instead of the whole server refusing to start.
    pub forecasts: Option<ForecastSet>,
}

/// Create the application router
pub fn create_router(
    dataset: Dataset,
    forecasts: Option<ForecastSet>,
    static_dir: Option<&str>,
) -> Router {
    let state = Arc::new(AppState { dataset, forecasts });

    let api_routes = Router::new()
        .route("/overview", get(handlers::get_overview))
        .route("/records", get(handlers::list_records))
        .route("/coverage", get(handlers::get_coverage))
        .route("/trends/:indicator", get(handlers::get_trends))
        .route("/events", get(handlers::list_events))
        .route("/targets", get(handlers::list_targets))
        .route("/forecasts", get(handlers::list_forecasts));

    // Read-only API for a local dashboard; GET from anywhere is fine
    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    dataset: Dataset,
    forecasts: Option<ForecastSet>,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    if forecasts.is_none() {
        info!("ℹ️  No forecast artifacts loaded (run 'birr forecast' to generate them)");
    }

    let app = create_router(dataset, forecasts, static_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting dashboard server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return a generic message to the client
            message: "An internal error occurred".to_string(),
            // Keep the full error for logging
            internal: Some(err),
        }
    }
}
