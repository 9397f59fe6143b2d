//! Baseline model provider
//!
//! OpenAI-compatible provider called when the proxy reports a cache miss

use super::Provider;
use crate::config::BaselineConfig;
use crate::models::{ChatCompletion, ChatCompletionRequest};
use crate::services::error_mapper;
use crate::services::transport::{HttpTransport, Transport, TransportRequest};
use crate::utils::error::{helpers::validation_error, CacheAIResult, ErrorContext};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Baseline Provider
#[derive(Debug, Clone)]
pub struct BaselineProvider {
    name: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl BaselineProvider {
    /// Create a provider talking HTTP to the configured endpoint
    pub fn new(config: &BaselineConfig, user_agent: &str) -> CacheAIResult<Self> {
        let base_url = resolve_base_url(config)?;
        let transport = Arc::new(HttpTransport::new(&base_url, user_agent)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a provider over an existing transport
    pub fn with_transport(config: &BaselineConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: config.provider.clone(),
            api_key: config.api_key.clone(),
            transport,
        }
    }

    /// Build the request sent to the baseline model
    ///
    /// Newer OpenAI models only accept `max_completion_tokens`, so
    /// `max_tokens` is moved there unless it is already set.
    pub fn build_request(request: &ChatCompletionRequest) -> ChatCompletionRequest {
        let mut baseline = request.clone();
        if let Some(max_tokens) = baseline.params.max_tokens.take() {
            baseline.params.max_completion_tokens.get_or_insert(max_tokens);
        }
        baseline
    }

    /// Build request headers
    fn build_headers(&self) -> CacheAIResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .validation_context("Baseline model API key contains invalid header characters")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

/// Resolve the base URL for a baseline configuration
///
/// Only the `openai` provider has a built-in default.
pub fn resolve_base_url(config: &BaselineConfig) -> CacheAIResult<String> {
    match (&config.base_url, config.provider.as_str()) {
        (Some(url), _) => Ok(url.trim_end_matches('/').to_string()),
        (None, "openai") => Ok(OPENAI_BASE_URL.to_string()),
        (None, other) => Err(validation_error(format!(
            "Unsupported baseline model provider '{}' without a base URL",
            other
        ))),
    }
}

#[async_trait]
impl Provider for BaselineProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> CacheAIResult<ChatCompletion> {
        info!(provider = %self.name, model = %request.model, "Calling baseline model");

        let baseline_request = Self::build_request(request);
        let body = serde_json::to_vec(&baseline_request)
            .validation_context("Failed to serialize baseline request")?;

        let raw = self
            .transport
            .send(TransportRequest {
                method: Method::POST,
                path: "/chat/completions".to_string(),
                headers: self.build_headers()?,
                body: Some(body.into()),
                timeout,
            })
            .await?;

        let body = error_mapper::classify(raw)?;
        let completion = ChatCompletion::from_slice(&body)?;

        debug!(provider = %self.name, id = %completion.id, "Baseline model request completed successfully");
        Ok(completion)
    }
}
