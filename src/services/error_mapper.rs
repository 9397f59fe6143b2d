//! Error mapper
//!
//! Translates HTTP status codes and provider error payloads into typed errors

use super::transport::RawResponse;
use crate::models::ErrorResponse;
use crate::utils::error::{ApiError, CacheAIResult, ErrorKind};
use bytes::Bytes;
use tracing::{error, warn};

/// Classify a raw response
///
/// 2xx bodies are passed through untouched; every other status becomes an
/// [`ApiError`] whose kind follows the status table in [`ErrorKind::from_status`].
pub fn classify(response: RawResponse) -> CacheAIResult<Bytes> {
    let kind = match ErrorKind::from_status(response.status) {
        None => return Ok(response.body),
        Some(kind) => kind,
    };

    let api_error = build_api_error(kind, &response);

    if kind == ErrorKind::Authentication {
        warn!("Client error: {} - Status code: {}", kind, response.status);
    } else {
        error!(
            status = response.status,
            code = api_error.code.as_deref().unwrap_or(""),
            "API error: {}",
            api_error.message
        );
    }

    Err(api_error.into())
}

fn build_api_error(kind: ErrorKind, response: &RawResponse) -> ApiError {
    let raw_text = response.text();

    // Try to parse as provider error format, otherwise keep the raw text
    let (message, error_type, code, body_retry_after) =
        match serde_json::from_slice::<ErrorResponse>(&response.body) {
            Ok(payload) => {
                let code = payload.error.code_string();
                let retry_after = payload.error.retry_after_string();
                (payload.error.message, payload.error.error_type, code, retry_after)
            }
            Err(_) => (fallback_message(response.status, &raw_text), None, None, None),
        };

    let retry_after = if kind == ErrorKind::RateLimit {
        response.retry_after().or(body_retry_after)
    } else {
        None
    };

    let message = match &retry_after {
        Some(hint) => format!("{} (retry after {})", message, hint),
        None => message,
    };

    ApiError {
        kind,
        status: response.status,
        message,
        error_type,
        code,
        retry_after,
        body: raw_text,
    }
}

fn fallback_message(status: u16, raw_text: &str) -> String {
    let trimmed = raw_text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    match reqwest::StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}
