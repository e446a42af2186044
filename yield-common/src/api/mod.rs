//! Shared HTTP API types and the API key check
//!
//! Contains only framework-independent code. The service wraps these with
//! axum extractors and middleware.

pub mod auth;
pub mod types;

pub use auth::{verify_api_key, ApiKeyError, API_KEY_HEADER, UNAUTHORIZED_MESSAGE};
pub use types::{
    decimal_string, Envelope, EnvelopeStatus, PredictionRequest, PredictionView, ValidationError,
};
