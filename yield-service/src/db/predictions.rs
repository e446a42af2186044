//! Prediction persistence gateway
//!
//! Records are insert-only. Listing orders by `created_at` descending with
//! `id` as tie-breaker, so two writes in the same clock tick still list
//! newest first.

use async_trait::async_trait;
use sqlx::SqlitePool;
use yield_common::db::{NewPrediction, PredictionRecord};
use yield_common::Result;

/// Storage operations the orchestrator needs
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Insert a prediction and return it with its assigned id
    async fn create(&self, prediction: NewPrediction) -> Result<PredictionRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PredictionRecord>>;

    /// All predictions, newest first
    async fn find_all_by_created_at_desc(&self) -> Result<Vec<PredictionRecord>>;

    /// Delete by id; a missing id is not an error
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite-backed [`PredictionStore`]
#[derive(Clone)]
pub struct SqlitePredictionStore {
    pool: SqlitePool,
}

impl SqlitePredictionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, latitude, longitude, hectare, yield_per_hektar, \
     total_yield_ton, soil_included, created_at FROM predictions";

#[async_trait]
impl PredictionStore for SqlitePredictionStore {
    async fn create(&self, prediction: NewPrediction) -> Result<PredictionRecord> {
        let id = sqlx::query(
            r#"
            INSERT INTO predictions (
                latitude, longitude, hectare, yield_per_hektar,
                total_yield_ton, soil_included, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(prediction.latitude)
        .bind(prediction.longitude)
        .bind(prediction.hectare)
        .bind(prediction.yield_per_hektar)
        .bind(prediction.total_yield_ton)
        .bind(prediction.soil_included)
        .bind(prediction.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(prediction.with_id(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PredictionRecord>> {
        let record = sqlx::query_as::<_, PredictionRecord>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_all_by_created_at_desc(&self) -> Result<Vec<PredictionRecord>> {
        let records = sqlx::query_as::<_, PredictionRecord>(&format!(
            "{} ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM predictions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(id, "Delete matched no prediction");
        }

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
