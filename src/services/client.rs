//! Chat completions client
//!
//! Caller-facing facade shaped like `client.chat().completions().create(...)`

use super::error_mapper;
use super::transport::{HttpTransport, Transport, TransportRequest};
use crate::config::ClientConfig;
use crate::models::{ChatCompletion, ChatCompletionRequest, ChatMessage, GenerationParams};
use crate::providers::{BaselineProvider, Provider};
use crate::utils::error::{helpers::validation_error, CacheAIResult, ErrorContext};
use crate::utils::logging::create_request_log_summary;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Chat completions endpoint path
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Header disabling the proxy's semantic cache
pub const ENABLE_CACHE_HEADER: &str = "x-cacheai-enable-cache";
/// Baseline provider header
pub const BASELINE_PROVIDER_HEADER: &str = "x-cacheai-baseline-model-provider";
/// Baseline API key header
pub const BASELINE_API_KEY_HEADER: &str = "x-cacheai-baseline-model-api-key";
/// Baseline base URL header
pub const BASELINE_BASE_URL_HEADER: &str = "x-cacheai-baseline-model-base-url";
/// Per-call request id header
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Timeout for this call, replacing the configured default
    pub timeout: Option<Duration>,
    /// Extra headers, applied after the client's own headers
    pub extra_headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

/// Cache AI client
///
/// Holds only immutable configuration, so clones can be shared freely
/// between concurrent tasks.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    baseline: Option<Arc<dyn Provider>>,
}

impl Client {
    /// Create a new client instance
    pub fn new(config: ClientConfig) -> CacheAIResult<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config.base_url, &config.user_agent)?);
        Self::with_transport(config, transport)
    }

    /// Create a client from `CACHEAI_*` environment variables
    pub fn from_env() -> CacheAIResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> CacheAIResult<Self> {
        config.validate()?;

        let baseline = match &config.baseline {
            Some(baseline) => {
                let provider = BaselineProvider::new(baseline, &config.user_agent)?;
                Some(Arc::new(provider) as Arc<dyn Provider>)
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            transport,
            baseline,
        })
    }

    /// Replace the provider called on a cache miss
    pub fn with_baseline_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.baseline = Some(provider);
        self
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Chat API resource
    pub fn chat(&self) -> Chat<'_> {
        Chat { client: self }
    }

    /// Build request headers
    fn build_headers(&self, request_id: &str, extra_headers: &[(String, String)]) -> CacheAIResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .validation_context("API key contains invalid header characters")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(request_id).validation_context("Invalid request id")?,
        );

        if !self.config.enable_cache {
            headers.insert(ENABLE_CACHE_HEADER, HeaderValue::from_static("false"));
        }

        if let Some(baseline) = &self.config.baseline {
            headers.insert(
                BASELINE_PROVIDER_HEADER,
                HeaderValue::from_str(&baseline.provider).validation_context("Invalid baseline provider")?,
            );
            let mut key = HeaderValue::from_str(&baseline.api_key)
                .validation_context("Baseline model API key contains invalid header characters")?;
            key.set_sensitive(true);
            headers.insert(BASELINE_API_KEY_HEADER, key);
            if let Some(url) = &baseline.base_url {
                headers.insert(
                    BASELINE_BASE_URL_HEADER,
                    HeaderValue::from_str(url).validation_context("Invalid baseline base URL")?,
                );
            }
        }

        for (name, value) in extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .validation_context(&format!("Invalid header name '{}'", name))?;
            let value = HeaderValue::from_str(value)
                .validation_context(&format!("Invalid value for header '{}'", name))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Send a chat completion request
    async fn chat_completions(
        &self,
        request: &ChatCompletionRequest,
        options: &RequestOptions,
    ) -> CacheAIResult<ChatCompletion> {
        request.validate()?;

        let request_id = Uuid::new_v4().simple().to_string();
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let headers = self.build_headers(&request_id, &options.extra_headers)?;
        let body = serde_json::to_vec(request).validation_context("Failed to serialize request")?;

        info!(request_id = %request_id, model = %request.model, "Creating chat completion");
        debug!(request_id = %request_id, request = %create_request_log_summary(request), "Request payload");

        let raw = self
            .transport
            .send(TransportRequest {
                method: Method::POST,
                path: CHAT_COMPLETIONS_PATH.to_string(),
                headers,
                body: Some(body.into()),
                timeout,
            })
            .await?;

        let body = error_mapper::classify(raw)?;

        if requires_baseline_model(&body) {
            info!(request_id = %request_id, "No cache hit, calling baseline model");
            let provider = self.baseline.as_ref().ok_or_else(|| {
                validation_error(
                    "Baseline model provider is required for baseline model calls. \
                     Configure a baseline or set CACHEAI_BASELINE_MODEL_PROVIDER.",
                )
            })?;
            return provider.chat_complete(request, timeout).await;
        }

        let completion = ChatCompletion::from_slice(&body)?;

        debug!(
            request_id = %request_id,
            id = %completion.id,
            total_tokens = completion.usage.total_tokens,
            "Chat completion request completed successfully"
        );
        Ok(completion)
    }
}

/// Whether a successful body asks the caller to fall back to the baseline model
///
/// Any truthy JSON value counts: `true`, a non-zero number, or a non-empty
/// string, array or object.
fn requires_baseline_model(body: &[u8]) -> bool {
    #[derive(serde::Deserialize)]
    struct Marker {
        #[serde(default)]
        requires_baseline_model: serde_json::Value,
    }

    let flag = match serde_json::from_slice::<Marker>(body) {
        Ok(marker) => marker.requires_baseline_model,
        Err(_) => return false,
    };

    match flag {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}

/// Chat API resource
#[derive(Debug, Clone, Copy)]
pub struct Chat<'a> {
    client: &'a Client,
}

impl<'a> Chat<'a> {
    /// Chat completions resource
    pub fn completions(&self) -> Completions<'a> {
        Completions { client: self.client }
    }
}

/// Chat completions resource
#[derive(Debug, Clone, Copy)]
pub struct Completions<'a> {
    client: &'a Client,
}

impl<'a> Completions<'a> {
    /// Create a chat completion
    pub async fn create(
        &self,
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        params: GenerationParams,
    ) -> CacheAIResult<ChatCompletion> {
        self.create_with_options(model, messages, params, RequestOptions::default())
            .await
    }

    /// Create a chat completion with per-call overrides
    pub async fn create_with_options(
        &self,
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        params: GenerationParams,
        options: RequestOptions,
    ) -> CacheAIResult<ChatCompletion> {
        let request = ChatCompletionRequest::new(model, messages, params);
        self.client.chat_completions(&request, &options).await
    }

    /// Send a prebuilt request
    pub async fn send(
        &self,
        request: &ChatCompletionRequest,
        options: &RequestOptions,
    ) -> CacheAIResult<ChatCompletion> {
        self.client.chat_completions(request, options).await
    }
}
