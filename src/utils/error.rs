//! Error handling module
//!
//! Defines the error hierarchy surfaced by the client

use std::fmt;
use thiserror::Error;

/// Error kind used for programmatic branching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client configuration is invalid
    Config,
    /// Caller input is malformed, no network call was made
    Validation,
    /// Transport-level failure (DNS, TLS, refused, timeout)
    Connection,
    /// 401 / 403
    Authentication,
    /// 404
    NotFound,
    /// 429
    RateLimit,
    /// 5xx
    ServerError,
    /// 400
    InvalidRequest,
    /// Response body does not match the expected schema
    Deserialization,
    /// Any unmapped status
    Unknown,
}

impl ErrorKind {
    /// Get error type string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config_error",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Connection => "connection_error",
            ErrorKind::Authentication => "authentication_error",
            ErrorKind::NotFound => "not_found_error",
            ErrorKind::RateLimit => "rate_limit_error",
            ErrorKind::ServerError => "server_error",
            ErrorKind::InvalidRequest => "invalid_request_error",
            ErrorKind::Deserialization => "deserialization_error",
            ErrorKind::Unknown => "unknown_error",
        }
    }

    /// Map an HTTP status code to an error kind
    ///
    /// Returns `None` for 2xx statuses.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            400 => Some(ErrorKind::InvalidRequest),
            401 | 403 => Some(ErrorKind::Authentication),
            404 => Some(ErrorKind::NotFound),
            429 => Some(ErrorKind::RateLimit),
            500..=599 => Some(ErrorKind::ServerError),
            _ => Some(ErrorKind::Unknown),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the provider with a non-2xx status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Kind derived from the HTTP status
    pub kind: ErrorKind,
    /// HTTP status code
    pub status: u16,
    /// Human-readable message
    pub message: String,
    /// Provider error type (optional)
    pub error_type: Option<String>,
    /// Provider error code (optional)
    pub code: Option<String>,
    /// Retry hint returned by the provider (optional)
    pub retry_after: Option<String>,
    /// Raw response body, kept for diagnostics
    pub body: String,
}

impl ApiError {
    /// Retry hint in whole seconds, when the provider sent a numeric value
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after
            .as_deref()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs.ceil() as u64)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {}): {}", self.kind, self.status, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [code: {}]", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Client error types
#[derive(Error, Debug)]
pub enum CacheAIError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Transport-level failure
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        timed_out: bool,
    },

    /// Response body did not match the expected schema
    #[error("Failed to deserialize response: {message}")]
    Deserialization {
        message: String,
        body: String,
    },

    /// Provider returned a non-2xx status
    #[error("{0}")]
    Api(ApiError),
}

impl CacheAIError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheAIError::Config(_) => ErrorKind::Config,
            CacheAIError::Validation(_) => ErrorKind::Validation,
            CacheAIError::Connection { .. } => ErrorKind::Connection,
            CacheAIError::Deserialization { .. } => ErrorKind::Deserialization,
            CacheAIError::Api(api) => api.kind,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            CacheAIError::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Provider-supplied error code
    pub fn code(&self) -> Option<&str> {
        match self {
            CacheAIError::Api(api) => api.code.as_deref(),
            _ => None,
        }
    }

    /// Provider error details, when the error came from a response
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CacheAIError::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Whether the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, CacheAIError::Connection { timed_out: true, .. })
    }

    /// Whether the caller may reasonably retry the request
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimit | ErrorKind::ServerError | ErrorKind::Connection
        )
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Authentication | ErrorKind::Config)
    }
}

impl From<ApiError> for CacheAIError {
    fn from(error: ApiError) -> Self {
        CacheAIError::Api(error)
    }
}

/// Result type alias
pub type CacheAIResult<T> = Result<T, CacheAIError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> CacheAIError {
        CacheAIError::Validation(message.into())
    }

    /// Create connection error
    pub fn connection_error(message: impl Into<String>, timed_out: bool) -> CacheAIError {
        CacheAIError::Connection {
            message: message.into(),
            timed_out,
        }
    }

    /// Create deserialization error
    pub fn deserialization_error(message: impl Into<String>, body: impl Into<String>) -> CacheAIError {
        CacheAIError::Deserialization {
            message: message.into(),
            body: body.into(),
        }
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add validation error context
    fn validation_context(self, message: &str) -> CacheAIResult<T>;

    /// Add deserialization error context, keeping the offending body
    fn deserialization_context(self, message: &str, body: &[u8]) -> CacheAIResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn validation_context(self, message: &str) -> CacheAIResult<T> {
        self.map_err(|e| CacheAIError::Validation(format!("{}: {}", message, e)))
    }

    fn deserialization_context(self, message: &str, body: &[u8]) -> CacheAIResult<T> {
        self.map_err(|e| CacheAIError::Deserialization {
            message: format!("{}: {}", message, e),
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}
