//! Client configuration settings
//!
//! Defines the configuration structures and environment loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.cacheai.tech/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("cacheai-rust/", env!("CARGO_PKG_VERSION"));

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// API base URL
    #[serde(rename = "baseUrl", default = "default_base_url")]
    pub base_url: String,
    /// Default request timeout
    #[serde(rename = "timeoutSecs", with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
    /// Whether the proxy may answer from its semantic cache
    #[serde(rename = "enableCache", default = "default_true")]
    pub enable_cache: bool,
    /// Baseline model used on a cache miss (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineConfig>,
    /// User agent sent with every request
    #[serde(rename = "userAgent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Baseline model configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Provider name (e.g., "openai")
    pub provider: String,
    /// Provider API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Custom provider base URL (optional)
    #[serde(rename = "baseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

impl ClientConfig {
    /// Create a configuration with default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout: default_timeout(),
            enable_cache: true,
            baseline: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_enabled(mut self, enable_cache: bool) -> Self {
        self.enable_cache = enable_cache;
        self
    }

    pub fn with_baseline(mut self, baseline: BaselineConfig) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let api_key = std::env::var("CACHEAI_API_KEY")
            .context("API key is required: set the CACHEAI_API_KEY environment variable")?;

        let timeout_secs: f64 = get_env_or_default("CACHEAI_TIMEOUT", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .context("Invalid CACHEAI_TIMEOUT value")?;
        let timeout = Duration::try_from_secs_f64(timeout_secs).context("Invalid CACHEAI_TIMEOUT value")?;

        let enable_cache = get_env_or_default("CACHEAI_ENABLE_CACHE", "true")
            .parse()
            .context("Invalid CACHEAI_ENABLE_CACHE flag")?;

        let baseline = match std::env::var("CACHEAI_BASELINE_MODEL_PROVIDER").ok() {
            Some(provider) => Some(BaselineConfig {
                provider,
                api_key: std::env::var("CACHEAI_BASELINE_MODEL_API_KEY").unwrap_or_default(),
                base_url: std::env::var("CACHEAI_BASELINE_MODEL_BASE_URL").ok(),
            }),
            None => None,
        };

        let config = Self::new(api_key)
            .with_base_url(get_env_or_default("CACHEAI_BASE_URL", DEFAULT_BASE_URL))
            .with_timeout(timeout)
            .with_cache_enabled(enable_cache);
        let config = Self { baseline, ..config };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("API key cannot be empty");
        }

        if self.api_key.contains(char::is_whitespace) {
            anyhow::bail!("API key cannot contain whitespace characters");
        }

        if !self.base_url.starts_with("http") {
            anyhow::bail!("Invalid base URL format, should start with 'http': {}", self.base_url);
        }

        if self.timeout.is_zero() {
            anyhow::bail!("Timeout cannot be 0");
        }

        if let Some(baseline) = &self.baseline {
            if baseline.provider.trim().is_empty() {
                anyhow::bail!("Baseline model provider cannot be empty");
            }
            if baseline.api_key.is_empty() {
                anyhow::bail!(
                    "Baseline model API key is required when a baseline provider is set \
                     (CACHEAI_BASELINE_MODEL_API_KEY)"
                );
            }
            if let Some(url) = &baseline.base_url {
                if !url.starts_with("http") {
                    anyhow::bail!("Invalid baseline base URL format, should start with 'http': {}", url);
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("enable_cache", &self.enable_cache)
            .field("baseline", &self.baseline)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl std::fmt::Debug for BaselineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineConfig")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LoggingConfig {
    /// Load logging settings from `RUST_LOG` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        Self {
            level: get_env_or_default("RUST_LOG", "info"),
            format: get_env_or_default("LOG_FORMAT", "text"),
        }
    }

    /// Validate log level and format
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.format);
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("ck-test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.enable_cache);
        assert!(config.baseline.is_none());
        assert!(config.user_agent.starts_with("cacheai-rust/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = ClientConfig::new("ck-test-key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_validation_failures() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("key with space").validate().is_err());
        assert!(ClientConfig::new("ck-test-key").with_base_url("ftp://x").validate().is_err());
        assert!(ClientConfig::new("ck-test-key").with_timeout(Duration::ZERO).validate().is_err());

        let baseline = BaselineConfig {
            provider: "openai".to_string(),
            api_key: String::new(),
            base_url: None,
        };
        assert!(ClientConfig::new("ck-test-key").with_baseline(baseline).validate().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ClientConfig::new("ck-secret").with_baseline(BaselineConfig {
            provider: "openai".to_string(),
            api_key: "sk-secret".to_string(),
            base_url: None,
        });
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ck-secret"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_logging_config_validation() {
        assert!(LoggingConfig::default().validate().is_ok());
        let bad = LoggingConfig { level: "loud".to_string(), format: "text".to_string() };
        assert!(bad.validate().is_err());
        let bad = LoggingConfig { level: "info".to_string(), format: "xml".to_string() };
        assert!(bad.validate().is_err());
    }
}
