//! Data models module
//!
//! Defines request and response data structures for the chat completions API

use serde::{Deserialize, Serialize};

pub mod chat;
pub mod completion;

pub use chat::*;
pub use completion::*;

/// Provider error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorDetail,
}

/// Provider error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error message
    pub message: String,
    /// Error type (optional)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Error code, string or number (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    /// Offending request parameter, any JSON shape (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<serde_json::Value>,
    /// Retry hint carried in the payload (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<serde_json::Value>,
}

impl ErrorDetail {
    /// Error code as a string, whatever JSON type the provider used
    pub fn code_string(&self) -> Option<String> {
        json_scalar_to_string(self.code.as_ref())
    }

    /// Retry hint as a string
    pub fn retry_after_string(&self) -> Option<String> {
        json_scalar_to_string(self.retry_after.as_ref())
    }
}

fn json_scalar_to_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
