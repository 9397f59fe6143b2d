//! Cache AI client library
//!
//! OpenAI-compatible chat completions client backed by the Cache AI
//! semantic caching proxy. Switching from OpenAI only takes a different
//! base URL and API key.
//!
//! ```no_run
//! use cacheai::{ChatMessage, Client, ClientConfig, GenerationParams};
//!
//! # async fn run() -> cacheai::CacheAIResult<()> {
//! let client = Client::new(ClientConfig::new("your-api-key"))?;
//! let response = client
//!     .chat()
//!     .completions()
//!     .create(
//!         "gpt-3.5-turbo",
//!         vec![ChatMessage::user("Hello!")],
//!         GenerationParams::new().temperature(0.7),
//!     )
//!     .await?;
//! println!("{}", response.content().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{BaselineConfig, ClientConfig, LoggingConfig};
pub use models::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, Choice, FinishReason, GenerationParams, Role, Stop,
    Usage,
};
pub use services::{Client, RequestOptions};
pub use utils::error::{ApiError, CacheAIError, CacheAIResult, ErrorKind};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
