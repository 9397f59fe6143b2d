//! Logging utilities
//!
//! Request summaries for debug logs and an opt-in subscriber setup for
//! applications embedding the client

use crate::config::LoggingConfig;
use crate::models::{ChatCompletionRequest, ChatMessage, Role};
use anyhow::{Context, Result};

/// Set to true to include full message contents in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars truncated)", head, total - max_chars)
    } else {
        s.to_string()
    }
}

/// Create a filtered version of a message for logging
fn filter_message(msg: &ChatMessage) -> serde_json::Value {
    // System prompts are truncated more aggressively
    let max_chars = if msg.role == Role::System { 100 } else { 200 };
    serde_json::json!({
        "role": msg.role,
        "content": truncate_content(&msg.content, max_chars),
    })
}

/// Create a filtered summary of a chat completion request for logging
/// Keeps original structure but truncates verbose content
pub fn create_request_log_summary(request: &ChatCompletionRequest) -> serde_json::Value {
    if VERBOSE_REQUEST_LOGGING {
        return serde_json::to_value(request).unwrap_or(serde_json::json!({"error": "serialize failed"}));
    }

    let filtered_messages: Vec<serde_json::Value> = request.messages.iter().map(filter_message).collect();

    serde_json::json!({
        "model": request.model,
        "max_tokens": request.params.max_tokens,
        "temperature": request.params.temperature,
        "messages": filtered_messages,
    })
}

/// Install a global tracing subscriber
///
/// The client itself never installs one; this is for binaries and tests
/// that want the client's logs without their own setup.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    tracing::info!("Logging system initialized");
    Ok(())
}
