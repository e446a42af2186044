//! API key verification
//!
//! Callers present a shared secret in the `X-API-KEY` header. Both the
//! configured and the presented key are hashed with SHA-256 before comparing,
//! so the comparison always covers 32 bytes regardless of input length.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here. The axum middleware lives in
//! `yield-service`.

use sha2::{Digest, Sha256};

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Body text of the 401 response
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid API Key";

/// API key check failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    /// Header absent
    Missing,
    /// Header present but wrong
    Mismatch,
}

impl std::fmt::Display for ApiKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKeyError::Missing => write!(f, "Missing {} header", API_KEY_HEADER),
            ApiKeyError::Mismatch => write!(f, "API key mismatch"),
        }
    }
}

impl std::error::Error for ApiKeyError {}

/// Verify a presented key against the configured one
///
/// `expected = None` disables the check and accepts every request.
pub fn verify_api_key(expected: Option<&str>, provided: Option<&str>) -> Result<(), ApiKeyError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = provided.ok_or(ApiKeyError::Missing)?;

    if digest(expected) == digest(provided) {
        Ok(())
    } else {
        Err(ApiKeyError::Mismatch)
    }
}

fn digest(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}
