//! yield-service library - Yield prediction gateway
//!
//! Forwards yield prediction requests to the external predictor, persists
//! successful answers and serves the prediction history.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod services;

use services::PredictionOrchestrator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PredictionOrchestrator>,
    /// Expected `X-API-KEY` value; `None` disables the check
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(orchestrator: Arc<PredictionOrchestrator>, api_key: Option<String>) -> Self {
        Self {
            orchestrator,
            api_key: api_key.map(Arc::from),
        }
    }
}

/// Build application router
///
/// `/api/ml/*` requires the API key; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected = Router::new()
        .route("/api/ml/predict", post(api::make_prediction))
        .route(
            "/api/ml/predictions/createdAt",
            get(api::get_all_predictions_by_date),
        )
        .route("/api/ml/predictions/:id", get(api::get_prediction_by_id))
        .route(
            "/api/ml/predictions/delete/:id",
            delete(api::delete_prediction),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
