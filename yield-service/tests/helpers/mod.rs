//! Test helpers for yield-service
//!
//! - Stub predictor: a real axum server on 127.0.0.1:0 answering `/predict`
//! - Counting test doubles for [`PredictorClient`] and [`PredictionStore`]
//! - Temporary SQLite store

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use yield_common::api::types::PredictionRequest;
use yield_common::config::PersistencePolicy;
use yield_common::db::{init_database, NewPrediction, PredictionRecord};
use yield_service::db::{PredictionStore, SqlitePredictionStore};
use yield_service::services::{
    HttpPredictorClient, PredictionOrchestrator, PredictionResult, PredictorClient, PredictorError,
};

pub const SCENARIO_A_BODY: &str =
    r#"{"status": "success", "data": {"totalYieldTon": "15.0", "soilIncluded": true}}"#;

// =============================================================================
// Stub predictor server
// =============================================================================

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

/// Running stub predictor
pub struct StubPredictor {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl StubPredictor {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent `/predict` call
    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

async fn stub_predict(
    State(state): State<StubState>,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = serde_json::from_str(&body).ok();

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Start a predictor that answers every call with `status` and `body`
pub async fn spawn_predictor(status: StatusCode, body: &str) -> StubPredictor {
    spawn_slow_predictor(status, body, Duration::ZERO).await
}

/// Start a predictor that waits `delay` before answering
pub async fn spawn_slow_predictor(status: StatusCode, body: &str, delay: Duration) -> StubPredictor {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));
    let state = StubState {
        status,
        body: body.to_string(),
        delay,
        hits: hits.clone(),
        last_body: last_body.clone(),
    };

    let app = Router::new()
        .route("/predict", post(stub_predict))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub predictor");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubPredictor {
        base_url: format!("http://{}", addr),
        hits,
        last_body,
    }
}

/// URL of a port with nothing listening (connection refused)
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn http_client(base_url: &str) -> HttpPredictorClient {
    HttpPredictorClient::new(base_url, Duration::from_secs(5)).expect("predictor client")
}

// =============================================================================
// Test doubles
// =============================================================================

type Reply = Box<dyn Fn() -> Result<PredictionResult, PredictorError> + Send + Sync>;

/// Predictor double returning a scripted reply and counting calls
pub struct ScriptedPredictor {
    reply: Reply,
    calls: AtomicUsize,
}

impl ScriptedPredictor {
    pub fn new(reply: impl Fn() -> Result<PredictionResult, PredictorError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with this JSON body
    pub fn answering(json: &str) -> Self {
        let json = json.to_string();
        Self::new(move || Ok(serde_json::from_str(&json).expect("scripted predictor JSON")))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictorClient for ScriptedPredictor {
    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }
}

/// In-memory store counting every call; optionally failing all of them
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<Vec<PredictionRecord>>,
    last_id: AtomicI64,
    calls: AtomicUsize,
    failing: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<PredictionRecord> {
        self.records.lock().unwrap().clone()
    }

    fn enter(&self) -> yield_common::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            Err(yield_common::Error::Database(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PredictionStore for RecordingStore {
    async fn create(&self, prediction: NewPrediction) -> yield_common::Result<PredictionRecord> {
        self.enter()?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = prediction.with_id(id);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> yield_common::Result<Option<PredictionRecord>> {
        self.enter()?;
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_all_by_created_at_desc(&self) -> yield_common::Result<Vec<PredictionRecord>> {
        self.enter()?;
        let mut records = self.records();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete_by_id(&self, id: i64) -> yield_common::Result<()> {
        self.enter()?;
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn count(&self) -> yield_common::Result<i64> {
        self.enter()?;
        Ok(self.records.lock().unwrap().len() as i64)
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Temporary SQLite-backed store; keep the TempDir alive for the test
pub async fn sqlite_store() -> (TempDir, Arc<SqlitePredictionStore>) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("predictions.db"))
        .await
        .unwrap();
    (temp_dir, Arc::new(SqlitePredictionStore::new(pool)))
}

pub fn orchestrator(
    predictor: Arc<dyn PredictorClient>,
    store: Arc<dyn PredictionStore>,
) -> PredictionOrchestrator {
    PredictionOrchestrator::new(predictor, store, PersistencePolicy::BestEffort)
}
