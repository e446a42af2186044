//! Prediction orchestrator
//!
//! Owns the exchange with the predictor and the decision to persist.
//!
//! Per submit call:
//! `Received → Validated → AwaitingPredictor → {PredictorFailed | PredictorSucceeded}
//!  → {Persisted | PersistFailedButReported} → ResponseSent`
//!
//! Every failure is terminal for the call and produces
//! `{"status": "error", "data": null}`. Nothing is retried and nothing
//! propagates to the caller as a fault.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use yield_common::api::types::{Envelope, PredictionRequest, PredictionView};
use yield_common::config::PersistencePolicy;
use yield_common::db::NewPrediction;

use crate::db::PredictionStore;
use crate::services::predictor_client::{PredictorClient, PredictorContract, PredictorError};

/// What happened to the write-behind for one submit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Record stored with this id
    Stored(i64),
    /// Predictor succeeded but the store rejected the write
    WriteFailed,
    /// Call ended before a record was built
    NotAttempted,
}

/// Envelope plus the persistence decision behind it
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub envelope: Envelope<PredictionView>,
    pub persistence: Persistence,
}

impl SubmitOutcome {
    fn rejected() -> Self {
        Self {
            envelope: Envelope::error(),
            persistence: Persistence::NotAttempted,
        }
    }
}

pub struct PredictionOrchestrator {
    predictor: Arc<dyn PredictorClient>,
    store: Arc<dyn PredictionStore>,
    policy: PersistencePolicy,
}

impl PredictionOrchestrator {
    pub fn new(
        predictor: Arc<dyn PredictorClient>,
        store: Arc<dyn PredictionStore>,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            predictor,
            store,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn PredictionStore> {
        &self.store
    }

    /// Forward a request to the predictor and persist a successful answer
    pub async fn submit_prediction(&self, request: PredictionRequest) -> Envelope<PredictionView> {
        self.submit(request).await.envelope
    }

    /// [`Self::submit_prediction`] with the persistence decision exposed
    pub async fn submit(&self, request: PredictionRequest) -> SubmitOutcome {
        info!(
            lat = request.lat,
            lon = request.lon,
            hectare = request.hectare,
            "Initiating prediction request"
        );

        if let Err(e) = request.validate() {
            warn!("Rejected prediction request: {}", e);
            return SubmitOutcome::rejected();
        }

        let result = match self.predictor.predict(&request).await {
            Ok(result) => result,
            Err(PredictorError::Transport(reason)) => {
                error!("Could not reach predictor: {}", reason);
                return SubmitOutcome::rejected();
            }
            Err(PredictorError::Protocol { status, body }) => {
                error!(status, body = %body, "Predictor returned HTTP error");
                return SubmitOutcome::rejected();
            }
            Err(PredictorError::Decode(reason)) => {
                error!("Predictor response could not be decoded: {}", reason);
                return SubmitOutcome::rejected();
            }
        };

        if !result.is_success() {
            warn!(
                status = %result.status,
                message = result.message.as_deref().unwrap_or(""),
                "Predictor reported failure"
            );
            return SubmitOutcome::rejected();
        }

        // Parse fully before touching storage: a bad figure must not leave a row behind
        let (total_yield_ton, soil_included) = match result.contract() {
            PredictorContract::Detailed {
                total_yield_ton,
                soil_included,
                ..
            } => match parse_tonnage(&total_yield_ton) {
                Some(total) => (total, soil_included),
                None => {
                    error!(total_yield_ton = %total_yield_ton, "Predictor total yield is not a number");
                    return SubmitOutcome::rejected();
                }
            },
            PredictorContract::Legacy { estimated_yield } => {
                error!(
                    estimated_yield = %estimated_yield,
                    "Predictor answered with legacy payload without total_yield_ton"
                );
                return SubmitOutcome::rejected();
            }
            PredictorContract::Missing => {
                error!("Predictor success response carried no yield data");
                return SubmitOutcome::rejected();
            }
        };

        let yield_per_hektar = yield_per_hectare(total_yield_ton, request.hectare);
        if !yield_per_hektar.is_finite() {
            error!(
                total_yield_ton,
                hectare = request.hectare,
                "Derived yield per hectare is not finite"
            );
            return SubmitOutcome::rejected();
        }

        let prediction = NewPrediction {
            latitude: request.lat,
            longitude: request.lon,
            hectare: request.hectare,
            yield_per_hektar,
            total_yield_ton,
            soil_included,
            created_at: Utc::now(),
        };

        let outcome = self.write_behind(prediction).await;
        if outcome.envelope.is_success() {
            info!(total_yield_ton, "Prediction successful");
        }
        outcome
    }

    /// Persist a successful prediction according to the configured policy
    async fn write_behind(&self, prediction: NewPrediction) -> SubmitOutcome {
        let unsaved = prediction.to_unsaved_view();

        match self.store.create(prediction).await {
            Ok(record) => {
                debug!(id = record.id, "Prediction stored");
                SubmitOutcome {
                    envelope: Envelope::success(record.to_view()),
                    persistence: Persistence::Stored(record.id),
                }
            }
            Err(e) => match self.policy {
                PersistencePolicy::BestEffort => {
                    error!("Failed to save prediction to database: {}", e);
                    SubmitOutcome {
                        envelope: Envelope::success(unsaved),
                        persistence: Persistence::WriteFailed,
                    }
                }
                PersistencePolicy::Required => {
                    error!("Failed to save prediction to database, failing call: {}", e);
                    SubmitOutcome {
                        envelope: Envelope::error(),
                        persistence: Persistence::WriteFailed,
                    }
                }
            },
        }
    }

    pub async fn get_prediction_by_id(&self, id: i64) -> Envelope<PredictionView> {
        info!(id, "Fetching prediction");

        match self.store.find_by_id(id).await {
            Ok(Some(record)) => Envelope::success(record.to_view()),
            Ok(None) => {
                warn!(id, "Prediction not found");
                Envelope::error()
            }
            Err(e) => {
                error!(id, "Failed to retrieve prediction: {}", e);
                Envelope::error()
            }
        }
    }

    /// All predictions, newest first; storage failure degrades to an empty list
    pub async fn list_predictions_by_recency(&self) -> Envelope<Vec<PredictionView>> {
        info!("Fetching all predictions ordered by creation date");

        match self.store.find_all_by_created_at_desc().await {
            Ok(records) => Envelope::success(records.iter().map(|r| r.to_view()).collect()),
            Err(e) => {
                error!("Failed to retrieve predictions from database: {}", e);
                Envelope::success(Vec::new())
            }
        }
    }

    /// Delete a prediction; missing ids and storage errors are not surfaced
    pub async fn delete_prediction(&self, id: i64) {
        info!(id, "Deleting prediction");

        if let Err(e) = self.store.delete_by_id(id).await {
            error!(id, "Failed to delete prediction: {}", e);
        }
    }
}

/// Parse the predictor's tonnage string
///
/// Only plain finite decimals are accepted; unit suffixes and NaN are not.
pub fn parse_tonnage(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Derived yield per hectare; caller guarantees `hectare > 0`
pub fn yield_per_hectare(total_yield_ton: f64, hectare: f64) -> f64 {
    total_yield_ton / hectare
}
