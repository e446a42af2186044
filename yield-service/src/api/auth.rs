//! API key middleware
//!
//! Applied to `/api/ml/*` only. The health endpoint stays open.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;
use yield_common::api::auth::{verify_api_key, ApiKeyError, API_KEY_HEADER, UNAUTHORIZED_MESSAGE};

use crate::AppState;

/// Reject requests whose `X-API-KEY` header does not match the configured key
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = verify_api_key(state.api_key.as_deref(), provided) {
        warn!(path = %request.uri().path(), "API key rejected: {}", e);
        return Err(AuthError(e));
    }

    Ok(next.run(request).await)
}

/// 401 response for a failed key check
#[derive(Debug)]
pub struct AuthError(pub ApiKeyError);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": UNAUTHORIZED_MESSAGE,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
