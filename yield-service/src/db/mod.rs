//! Database access layer for yield-service

mod predictions;

pub use predictions::{PredictionStore, SqlitePredictionStore};
