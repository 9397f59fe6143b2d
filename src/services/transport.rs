//! HTTP transport
//!
//! Sends a single request to the configured base URL. The transport only
//! decides connectivity; status interpretation belongs to the error mapper.

use crate::utils::error::{
    helpers::{connection_error, validation_error},
    CacheAIError, CacheAIResult,
};
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Method};
use std::error::Error as StdError;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, warn};

/// Request handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL (e.g., "/chat/completions")
    pub path: String,
    /// Request headers, must carry `Authorization`
    pub headers: HeaderMap,
    /// Serialized JSON body (optional)
    pub body: Option<Bytes>,
    /// Deadline for the whole round trip
    pub timeout: Duration,
}

/// Raw HTTP response, success or not
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the `Retry-After` header
    pub fn retry_after(&self) -> Option<String> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport seam between the client facade and the network
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send a request and return the raw response
    ///
    /// Fails only on transport-level problems (DNS, TLS, refused, timeout).
    async fn send(&self, request: TransportRequest) -> CacheAIResult<RawResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given base URL
    pub fn new(base_url: &str, user_agent: &str) -> CacheAIResult<Self> {
        // Redirects are surfaced as responses so 3xx maps to an Unknown error
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the request URL
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> CacheAIResult<RawResponse> {
        if !request.headers.contains_key(AUTHORIZATION) {
            return Err(validation_error("Authorization header is required"));
        }

        let url = self.build_url(&request.path);
        debug!(method = %request.method, url = %url, timeout_ms = request.timeout.as_millis() as u64, "Sending HTTP request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers)
            .timeout(request.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;

        debug!(status, bytes = body.len(), "Received HTTP response");
        Ok(RawResponse { status, headers, body })
    }
}

/// Convert a reqwest failure into a connection error
fn map_transport_error(error: reqwest::Error) -> CacheAIError {
    let detail = error_chain(&error);

    if error.is_builder() {
        return validation_error(format!("Invalid request: {}", detail));
    }

    if error.is_timeout() {
        warn!("Request timed out: {}", detail);
        connection_error(format!("Request timed out: {}", detail), true)
    } else {
        warn!("Request failed: {}", detail);
        connection_error(format!("Request failed: {}", detail), false)
    }
}

/// Join an error and its sources into one line
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
