//! Provider module
//!
//! Defines the Provider trait for upstream models called on a cache miss

pub mod baseline;

use crate::models::{ChatCompletion, ChatCompletionRequest};
use crate::utils::error::CacheAIResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Provider trait for baseline model providers
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send a chat completion request (non-streaming)
    async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> CacheAIResult<ChatCompletion>;
}

pub use baseline::BaselineProvider;
