//! Database models

use crate::api::types::{decimal_string, PredictionView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored prediction row
///
/// Written once when the predictor succeeds; never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub hectare: f64,
    pub yield_per_hektar: f64,
    pub total_yield_ton: f64,
    pub soil_included: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a prediction (storage assigns the id)
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub latitude: f64,
    pub longitude: f64,
    pub hectare: f64,
    pub yield_per_hektar: f64,
    pub total_yield_ton: f64,
    pub soil_included: bool,
    pub created_at: DateTime<Utc>,
}

impl NewPrediction {
    /// Attach the storage id
    pub fn with_id(self, id: i64) -> PredictionRecord {
        PredictionRecord {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            hectare: self.hectare,
            yield_per_hektar: self.yield_per_hektar,
            total_yield_ton: self.total_yield_ton,
            soil_included: self.soil_included,
            created_at: self.created_at,
        }
    }

    /// Envelope view for a prediction whose write did not land
    pub fn to_unsaved_view(&self) -> PredictionView {
        PredictionView {
            id: None,
            lat: self.latitude,
            lon: self.longitude,
            hectare: self.hectare,
            yield_per_hektar: decimal_string(self.yield_per_hektar),
            total_yield_ton: decimal_string(self.total_yield_ton),
            soil_included: self.soil_included,
            created_at: self.created_at,
        }
    }
}

impl PredictionRecord {
    pub fn to_view(&self) -> PredictionView {
        PredictionView {
            id: Some(self.id),
            lat: self.latitude,
            lon: self.longitude,
            hectare: self.hectare,
            yield_per_hektar: decimal_string(self.yield_per_hektar),
            total_yield_ton: decimal_string(self.total_yield_ton),
            soil_included: self.soil_included,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPrediction {
        NewPrediction {
            latitude: 41.0258,
            longitude: 28.8892,
            hectare: 10.0,
            yield_per_hektar: 1.5,
            total_yield_ton: 15.0,
            soil_included: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_view_formats_yields() {
        let record = sample().with_id(7);
        let view = record.to_view();

        assert_eq!(view.id, Some(7));
        assert_eq!(view.total_yield_ton, "15.0");
        assert_eq!(view.yield_per_hektar, "1.5");
        assert_eq!(view.lat, 41.0258);
        assert!(view.soil_included);
    }

    #[test]
    fn test_unsaved_view_has_no_id() {
        let view = sample().to_unsaved_view();

        assert_eq!(view.id, None);
        assert_eq!(view.total_yield_ton, "15.0");
    }
}
