//! Prediction services: outbound predictor client and the orchestrator

pub mod orchestrator;
pub mod predictor_client;

pub use orchestrator::{Persistence, PredictionOrchestrator, SubmitOutcome};
pub use predictor_client::{
    HttpPredictorClient, PredictionPayload, PredictionResult, PredictorClient, PredictorContract,
    PredictorError, PREDICT_ROUTE,
};
