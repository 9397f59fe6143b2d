//! Configuration management module
//!
//! Loads client configuration from environment variables or a JSON file

pub mod file;
pub mod settings;

pub use settings::{BaselineConfig, ClientConfig, LoggingConfig};
