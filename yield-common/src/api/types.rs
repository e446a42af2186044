//! Shared API request/response types
//!
//! Every gateway operation answers with an [`Envelope`]: `{"status", "data"}`.
//! Failures carry `data: null` and never say which stage failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ========================================
// Request Types
// ========================================

/// Yield prediction request
///
/// Accepted from callers and forwarded to the predictor as `{lat, lon, hectare}`.
///
/// # Examples
///
/// ```
/// use yield_common::api::types::PredictionRequest;
///
/// let request: PredictionRequest =
///     serde_json::from_str(r#"{"lat": 41.0258, "lon": 28.8892, "hectare": 10.0}"#).unwrap();
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PredictionRequest {
    /// Latitude in degrees, [-90, 90]
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude in degrees, [-180, 180]
    #[serde(alias = "longitude")]
    pub lon: f64,
    /// Field area in hectares, strictly positive
    #[serde(alias = "areaHectares", alias = "area_hectares")]
    pub hectare: f64,
}

/// Reason a request was rejected before reaching the predictor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
    #[error("area must be a positive number of hectares, got {0}")]
    Area(f64),
}

impl PredictionRequest {
    pub fn new(lat: f64, lon: f64, hectare: f64) -> Self {
        Self { lat, lon, hectare }
    }

    /// Check coordinate ranges and the area guard
    ///
    /// NaN fails every range check, so non-finite input is rejected here too.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ValidationError::Latitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(ValidationError::Longitude(self.lon));
        }
        if !(self.hectare.is_finite() && self.hectare > 0.0) {
            return Err(ValidationError::Area(self.hectare));
        }
        Ok(())
    }
}

// ========================================
// Response Types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Uniform response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: Some(data),
        }
    }

    /// `{"status": "error", "data": null}`
    pub fn error() -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}

/// Envelope payload for a single prediction
///
/// Yield figures are rendered as decimal strings (`"15.0"`, `"1.5"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionView {
    /// Storage id; `null` when the write-behind did not land
    pub id: Option<i64>,
    pub lat: f64,
    pub lon: f64,
    pub hectare: f64,
    pub yield_per_hektar: String,
    pub total_yield_ton: String,
    pub soil_included: bool,
    pub created_at: DateTime<Utc>,
}

/// Render a float the way the envelope carries yield figures
///
/// Always keeps a decimal point, so whole tonnages read `15.0` rather than `15`.
pub fn decimal_string(value: f64) -> String {
    format!("{:?}", value)
}

// ========================================
// Tests
// ========================================
