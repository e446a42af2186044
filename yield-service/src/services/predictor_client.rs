//! External yield predictor client
//!
//! One `POST {base}/predict` per call with the request as `{lat, lon, hectare}`.
//! Single attempt, no retries. The reqwest client carries a bounded total
//! timeout so a stalled predictor cannot hang the caller.
//!
//! The predictor's payload has changed shape over time. Two contracts are
//! recognized:
//! - **Detailed** (canonical): `{yield_per_hektar, total_yield_ton, soil_included, lat?, lon?}`
//! - **Legacy**: `{estimated_yield}`, a display string such as `"1500 kg/hektar"`
//!
//! Field names are accepted in snake_case and camelCase, and numeric fields
//! as JSON strings or numbers.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use yield_common::api::types::{decimal_string, PredictionRequest};
use yield_common::config::ServiceConfig;

/// Route appended to the predictor base URL
pub const PREDICT_ROUTE: &str = "/predict";

const USER_AGENT: &str = concat!("yield-gateway/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Longest error body kept for logging
const MAX_ERROR_BODY: usize = 512;

/// Classified predictor failure
#[derive(Debug, Error)]
pub enum PredictorError {
    /// Connection refused, DNS failure, timeout or reset
    #[error("Predictor unreachable: {0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("Predictor returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// 2xx response whose body is not the expected JSON shape
    #[error("Predictor response could not be decoded: {0}")]
    Decode(String),
}

/// Number carried either as a JSON string or a JSON number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericText {
    Text(String),
    Number(f64),
}

impl NumericText {
    /// Textual form; numbers render with a decimal point
    pub fn to_text(&self) -> String {
        match self {
            NumericText::Text(text) => text.clone(),
            NumericText::Number(value) => decimal_string(*value),
        }
    }
}

/// Raw `data` object from the predictor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionPayload {
    #[serde(
        default,
        alias = "yieldPerHektar",
        alias = "yield_per_hectare",
        alias = "yieldPerHectare"
    )]
    pub yield_per_hektar: Option<NumericText>,

    #[serde(default, alias = "totalYieldTon")]
    pub total_yield_ton: Option<NumericText>,

    #[serde(default, alias = "soilIncluded")]
    pub soil_included: Option<bool>,

    /// Echoed coordinates; informational only
    #[serde(default)]
    pub lat: Option<NumericText>,

    #[serde(default)]
    pub lon: Option<NumericText>,

    #[serde(default, alias = "estimatedYield")]
    pub estimated_yield: Option<NumericText>,
}

/// Decoded predictor response (untrusted)
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResult {
    pub status: String,

    /// Failure reason, sent alongside `status: "error"`
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Option<PredictionPayload>,
}

/// Which payload contract a successful response follows
#[derive(Debug, Clone, PartialEq)]
pub enum PredictorContract {
    Detailed {
        total_yield_ton: String,
        yield_per_hektar: Option<String>,
        soil_included: bool,
    },
    Legacy {
        estimated_yield: String,
    },
    Missing,
}

impl PredictionResult {
    /// Case-insensitive `"success"` check
    pub fn is_success(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("success")
    }

    pub fn contract(&self) -> PredictorContract {
        let Some(data) = &self.data else {
            return PredictorContract::Missing;
        };

        if let Some(total) = &data.total_yield_ton {
            return PredictorContract::Detailed {
                total_yield_ton: total.to_text(),
                yield_per_hektar: data.yield_per_hektar.as_ref().map(NumericText::to_text),
                soil_included: data.soil_included.unwrap_or(false),
            };
        }

        match &data.estimated_yield {
            Some(estimate) => PredictorContract::Legacy {
                estimated_yield: estimate.to_text(),
            },
            None => PredictorContract::Missing,
        }
    }
}

/// Outbound call to the yield predictor
#[async_trait]
pub trait PredictorClient: Send + Sync {
    async fn predict(&self, request: &PredictionRequest)
        -> Result<PredictionResult, PredictorError>;
}

/// reqwest-backed predictor client
pub struct HttpPredictorClient {
    http_client: reqwest::Client,
    predict_url: String,
}

impl HttpPredictorClient {
    /// Create a client for `base_url` with a bounded per-call timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PredictorError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| PredictorError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            predict_url: format!("{}{}", base_url.trim_end_matches('/'), PREDICT_ROUTE),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, PredictorError> {
        Self::new(&config.predictor_url, config.predictor_timeout)
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl PredictorClient for HttpPredictorClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        tracing::debug!(url = %self.predict_url, "Calling yield predictor");

        let response = self
            .http_client
            .post(&self.predict_url)
            .json(request)
            .send()
            .await
            .map_err(|e| PredictorError::Transport(e.to_string()))?;

        let status = response.status();

        // Body read can still time out or reset mid-stream
        let body = response
            .text()
            .await
            .map_err(|e| PredictorError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PredictorError::Protocol {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str::<PredictionResult>(&body)
            .map_err(|e| PredictorError::Decode(e.to_string()))
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
