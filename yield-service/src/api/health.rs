//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Stored prediction count; `null` when the database is unreachable
    pub predictions: Option<i64>,
}

/// GET /health
///
/// Does NOT require the API key.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let predictions = match state.orchestrator.store().count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Health check could not count predictions: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "yield-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        predictions,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
