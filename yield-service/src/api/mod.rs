//! HTTP API handlers for yield-service

pub mod auth;
pub mod health;
pub mod predictions;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use predictions::{
    delete_prediction, get_all_predictions_by_date, get_prediction_by_id, make_prediction,
};
