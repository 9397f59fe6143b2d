//! Chat completion response models
//!
//! Parsing is strict on structure and permissive on unknown fields

use super::chat::ChatMessage;
use crate::utils::error::{helpers::deserialization_error, CacheAIResult, ErrorContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Chat completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Response ID
    pub id: String,
    /// Object type
    #[serde(default = "default_object")]
    pub object: String,
    /// Creation timestamp (seconds since the Unix epoch)
    pub created: i64,
    /// Model used
    pub model: String,
    /// Choice list
    pub choices: Vec<Choice>,
    /// Usage statistics
    pub usage: Usage,
    /// System fingerprint (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

fn default_object() -> String {
    "chat.completion".to_string()
}

/// Completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: ChatMessage,
    /// Finish reason
    #[serde(default, deserialize_with = "deserialize_finish_reason")]
    pub finish_reason: FinishReason,
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    #[default]
    #[serde(other)]
    Other,
}

fn deserialize_finish_reason<'de, D>(deserializer: D) -> Result<FinishReason, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FinishReason>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt token count
    pub prompt_tokens: u32,
    /// Completion token count
    pub completion_tokens: u32,
    /// Total token count
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Whether `total_tokens` equals prompt plus completion
    pub fn is_consistent(&self) -> bool {
        u64::from(self.prompt_tokens) + u64::from(self.completion_tokens) == u64::from(self.total_tokens)
    }
}

impl ChatCompletion {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> CacheAIResult<Self> {
        let completion: ChatCompletion = serde_json::from_slice(body)
            .deserialization_context("Invalid chat completion response", body)?;
        completion.check(body)?;
        Ok(completion)
    }

    /// Parse an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> CacheAIResult<Self> {
        let raw = value.to_string();
        let completion: ChatCompletion = serde_json::from_value(value)
            .deserialization_context("Invalid chat completion response", raw.as_bytes())?;
        completion.check(raw.as_bytes())?;
        Ok(completion)
    }

    fn check(&self, body: &[u8]) -> CacheAIResult<()> {
        let raw = || String::from_utf8_lossy(body).into_owned();

        if self.choices.is_empty() {
            return Err(deserialization_error("Response contains no choices", raw()));
        }

        let mut seen = HashSet::with_capacity(self.choices.len());
        for choice in &self.choices {
            if !seen.insert(choice.index) {
                return Err(deserialization_error(
                    format!("Duplicate choice index {}", choice.index),
                    raw(),
                ));
            }
        }

        if !self.usage.is_consistent() {
            return Err(deserialization_error(
                format!(
                    "Usage total_tokens {} does not equal prompt_tokens {} + completion_tokens {}",
                    self.usage.total_tokens, self.usage.prompt_tokens, self.usage.completion_tokens
                ),
                raw(),
            ));
        }

        Ok(())
    }

    /// Content of the first choice
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }

    /// Creation time as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

/// Parse a chat completion response body
pub fn parse_completion(body: &[u8]) -> CacheAIResult<ChatCompletion> {
    ChatCompletion::from_slice(body)
}
