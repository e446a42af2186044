//! Prediction endpoints
//!
//! Thin wrappers over [`PredictionOrchestrator`](crate::services::PredictionOrchestrator).
//! Envelopes are always returned with HTTP 200; the envelope status carries
//! success or failure.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;
use yield_common::api::types::{Envelope, PredictionRequest, PredictionView};

use crate::AppState;

/// POST /api/ml/predict
pub async fn make_prediction(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Json<Envelope<PredictionView>> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Malformed prediction request: {}", rejection.body_text());
            return Json(Envelope::error());
        }
    };

    Json(state.orchestrator.submit_prediction(request).await)
}

/// GET /api/ml/predictions/createdAt
pub async fn get_all_predictions_by_date(
    State(state): State<AppState>,
) -> Json<Envelope<Vec<PredictionView>>> {
    Json(state.orchestrator.list_predictions_by_recency().await)
}

/// GET /api/ml/predictions/:id
pub async fn get_prediction_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Envelope<PredictionView>> {
    Json(state.orchestrator.get_prediction_by_id(id).await)
}

/// DELETE /api/ml/predictions/delete/:id
pub async fn delete_prediction(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    state.orchestrator.delete_prediction(id).await;
    StatusCode::OK
}
