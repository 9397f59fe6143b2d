//! Chat completion request models
//!
//! Defines the message and request structures sent to `/chat/completions`

use crate::utils::error::{helpers::validation_error, CacheAIResult, ErrorContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::utils::error::CacheAIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(validation_error(format!(
                "Unrecognized message role '{}', expected system, user or assistant",
                other
            ))),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (system/user/assistant)
    pub role: Role,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Build a message from an untyped role name
    pub fn parse(role: &str, content: impl Into<String>) -> CacheAIResult<Self> {
        Ok(Self::new(role.parse()?, content))
    }
}

/// Stop sequences, a single string or up to four strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
    Single(String),
    Multiple(Vec<String>),
}

/// Maximum number of stop sequences accepted by the API
pub const MAX_STOP_SEQUENCES: usize = 4;

/// Names of the optional generation parameters the client forwards
pub const RECOGNIZED_PARAMS: &[&str] = &[
    "temperature",
    "max_tokens",
    "max_completion_tokens",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "stop",
    "n",
    "seed",
    "user",
];

/// Optional generation parameters
///
/// The set of parameters is closed: [`GenerationParams::set`] rejects any name
/// outside [`RECOGNIZED_PARAMS`] instead of forwarding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature (0-2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Maximum completion tokens, used by newer models instead of `max_tokens`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    /// Nucleus sampling threshold (0-1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Frequency penalty (-2.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Presence penalty (-2.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Stop>,
    /// Number of choices to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Sampling seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// End-user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn max_completion_tokens(mut self, max_completion_tokens: u32) -> Self {
        self.max_completion_tokens = Some(max_completion_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn stop(mut self, stop: Stop) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set a parameter by name from an untyped JSON value
    ///
    /// A JSON `null` clears the parameter.
    pub fn set(&mut self, name: &str, value: serde_json::Value) -> CacheAIResult<()> {
        let context = format!("Invalid value for '{}'", name);
        match name {
            "temperature" => self.temperature = serde_json::from_value(value).validation_context(&context)?,
            "max_tokens" => self.max_tokens = serde_json::from_value(value).validation_context(&context)?,
            "max_completion_tokens" => {
                self.max_completion_tokens = serde_json::from_value(value).validation_context(&context)?
            }
            "top_p" => self.top_p = serde_json::from_value(value).validation_context(&context)?,
            "frequency_penalty" => {
                self.frequency_penalty = serde_json::from_value(value).validation_context(&context)?
            }
            "presence_penalty" => {
                self.presence_penalty = serde_json::from_value(value).validation_context(&context)?
            }
            "stop" => self.stop = serde_json::from_value(value).validation_context(&context)?,
            "n" => self.n = serde_json::from_value(value).validation_context(&context)?,
            "seed" => self.seed = serde_json::from_value(value).validation_context(&context)?,
            "user" => self.user = serde_json::from_value(value).validation_context(&context)?,
            unknown => {
                return Err(validation_error(format!(
                    "Unrecognized generation parameter '{}', expected one of: {}",
                    unknown,
                    RECOGNIZED_PARAMS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Build parameters from name/value pairs, rejecting unknown names
    pub fn from_options<I, K>(options: I) -> CacheAIResult<Self>
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: AsRef<str>,
    {
        let mut params = Self::default();
        for (name, value) in options {
            params.set(name.as_ref(), value)?;
        }
        Ok(params)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> CacheAIResult<()> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presence_penalty", self.presence_penalty, -2.0, 2.0)?;

        if self.max_tokens == Some(0) {
            return Err(validation_error("'max_tokens' must be greater than 0"));
        }
        if self.max_completion_tokens == Some(0) {
            return Err(validation_error("'max_completion_tokens' must be greater than 0"));
        }
        if self.n == Some(0) {
            return Err(validation_error("'n' must be greater than 0"));
        }

        if let Some(Stop::Multiple(sequences)) = &self.stop {
            if sequences.is_empty() || sequences.len() > MAX_STOP_SEQUENCES {
                return Err(validation_error(format!(
                    "'stop' must contain between 1 and {} sequences, got {}",
                    MAX_STOP_SEQUENCES,
                    sequences.len()
                )));
            }
        }

        Ok(())
    }

    /// Whether no parameter is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn check_range(name: &str, value: Option<f32>, min: f32, max: f32) -> CacheAIResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < min || v > max => Err(validation_error(format!(
            "'{}' must be between {} and {}, got {}",
            name, min, max, v
        ))),
        _ => Ok(()),
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model name
    pub model: String,
    /// Message list
    pub messages: Vec<ChatMessage>,
    /// Optional generation parameters
    #[serde(flatten)]
    pub params: GenerationParams,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>, params: GenerationParams) -> Self {
        Self {
            model: model.into(),
            messages,
            params,
        }
    }

    /// Validate the request before it is sent
    pub fn validate(&self) -> CacheAIResult<()> {
        if self.model.trim().is_empty() {
            return Err(validation_error("Model name cannot be empty"));
        }
        if self.messages.is_empty() {
            return Err(validation_error("Messages cannot be empty"));
        }
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_request_serialization_shape() {
        let request = ChatCompletionRequest::new(
            "gpt-3.5-turbo",
            vec![ChatMessage::system("Be brief"), ChatMessage::user("Hello!")],
            GenerationParams::new().temperature(0.5).max_tokens(64),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "Be brief"},
                    {"role": "user", "content": "Hello!"}
                ],
                "temperature": 0.5,
                "max_tokens": 64
            })
        );
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        let err = ChatMessage::parse("tool", "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_set_unknown_param_rejected() {
        let mut params = GenerationParams::new();
        let err = params.set("temprature", json!(0.3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("temprature"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_set_wrong_type_rejected() {
        let mut params = GenerationParams::new();
        let err = params.set("max_tokens", json!("many")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_set_null_clears() {
        let mut params = GenerationParams::new().top_p(0.9);
        params.set("top_p", serde_json::Value::Null).unwrap();
        assert_eq!(params.top_p, None);
    }

    #[test]
    fn test_from_options_stop_variants() {
        let params = GenerationParams::from_options([
            ("stop", json!(["\n", "END"])),
            ("temperature", json!(1)),
        ])
        .unwrap();
        assert_eq!(params.stop, Some(Stop::Multiple(vec!["\n".to_string(), "END".to_string()])));
        assert_eq!(params.temperature, Some(1.0));

        let params = GenerationParams::from_options([("stop", json!("END"))]).unwrap();
        assert_eq!(params.stop, Some(Stop::Single("END".to_string())));
    }

    #[test]
    fn test_param_ranges() {
        assert!(GenerationParams::new().temperature(2.0).validate().is_ok());
        assert!(GenerationParams::new().temperature(2.5).validate().is_err());
        assert!(GenerationParams::new().top_p(-0.1).validate().is_err());
        assert!(GenerationParams::new().presence_penalty(-2.0).validate().is_ok());
        assert!(GenerationParams::new().frequency_penalty(f32::NAN).validate().is_err());
        assert!(GenerationParams::new().max_tokens(0).validate().is_err());

        let five = Stop::Multiple((0..5).map(|i| i.to_string()).collect());
        assert!(GenerationParams::new().stop(five).validate().is_err());
    }

    #[test]
    fn test_request_validation() {
        let empty = ChatCompletionRequest::new("gpt-4o", vec![], GenerationParams::default());
        assert_eq!(empty.validate().unwrap_err().kind(), ErrorKind::Validation);

        let no_model = ChatCompletionRequest::new("  ", vec![ChatMessage::user("hi")], GenerationParams::default());
        assert!(no_model.validate().is_err());

        let ok = ChatCompletionRequest::new("gpt-4o", vec![ChatMessage::user("hi")], GenerationParams::default());
        assert!(ok.validate().is_ok());
    }
}
