//! HTTP predictor client tests against a stub predictor
//!
//! Verifies the wire contract (`POST /predict`, `{lat, lon, hectare}`) and the
//! transport / protocol / decode failure classification.

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use std::time::Duration;
use yield_common::api::types::PredictionRequest;
use yield_service::services::{
    HttpPredictorClient, PredictorClient, PredictorContract, PredictorError,
};

fn request() -> PredictionRequest {
    PredictionRequest::new(41.025813, 28.889179, 10.0)
}

#[tokio::test]
async fn test_posts_request_fields_verbatim() {
    let stub = spawn_predictor(StatusCode::OK, SCENARIO_A_BODY).await;
    let client = http_client(&stub.base_url);

    client.predict(&request()).await.unwrap();

    assert_eq!(stub.hits(), 1);
    let body = stub.last_body().unwrap();
    assert_eq!(body["lat"], 41.025813);
    assert_eq!(body["lon"], 28.889179);
    assert_eq!(body["hectare"], 10.0);
    assert_eq!(body.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_decodes_detailed_response() {
    let stub = spawn_predictor(
        StatusCode::OK,
        r#"{
            "status": "success",
            "data": {
                "lat": 41.025813,
                "lon": 28.889179,
                "yield_per_hektar": "0.55",
                "total_yield_ton": "5.5",
                "soil_included": true
            }
        }"#,
    )
    .await;
    let client = http_client(&format!("{}/", stub.base_url));

    let result = client.predict(&request()).await.unwrap();

    assert!(result.is_success());
    assert_eq!(
        result.contract(),
        PredictorContract::Detailed {
            total_yield_ton: "5.5".to_string(),
            yield_per_hektar: Some("0.55".to_string()),
            soil_included: true,
        }
    );
}

#[tokio::test]
async fn test_predictor_error_status_is_decoded_not_failed() {
    let stub = spawn_predictor(
        StatusCode::OK,
        r#"{"status": "error", "message": "Cloud cover too high", "debug": "Check container logs for more details"}"#,
    )
    .await;
    let client = http_client(&stub.base_url);

    let result = client.predict(&request()).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.message.as_deref(), Some("Cloud cover too high"));
}

#[tokio::test]
async fn test_http_500_is_protocol_error() {
    let stub = spawn_predictor(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": "boom"}"#).await;
    let client = http_client(&stub.base_url);

    let err = client.predict(&request()).await.unwrap_err();

    match err {
        PredictorError::Protocol { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_404_is_protocol_error() {
    let stub = spawn_predictor(StatusCode::OK, SCENARIO_A_BODY).await;
    // Base URL pointing at a sub-path the stub does not serve
    let client = http_client(&format!("{}/v2", stub.base_url));

    let err = client.predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Protocol { status: 404, .. }));
    assert_eq!(stub.hits(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let stub = spawn_predictor(StatusCode::OK, "<html>gateway</html>").await;
    let client = http_client(&stub.base_url);

    let err = client.predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Decode(_)));
}

#[tokio::test]
async fn test_missing_status_is_decode_error() {
    let stub = spawn_predictor(StatusCode::OK, r#"{"data": {"total_yield_ton": "1.0"}}"#).await;
    let client = http_client(&stub.base_url);

    let err = client.predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = http_client(&unreachable_url().await);

    let err = client.predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let stub = spawn_slow_predictor(StatusCode::OK, SCENARIO_A_BODY, Duration::from_secs(5)).await;
    let client = HttpPredictorClient::new(&stub.base_url, Duration::from_millis(150)).unwrap();

    let err = client.predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Transport(_)));
    assert_eq!(stub.hits(), 1, "single attempt, no retry");
}
