//! File-based configuration loading
//!
//! Loads client configuration from a JSON file

use super::settings::ClientConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "cacheai.json";

impl ClientConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;
        let base_url = config.base_url.clone();
        let config = config.with_base_url(base_url);

        config.validate()?;

        debug!(base_url = %config.base_url, baseline = config.baseline.is_some(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/cacheai/cacheai.json
    /// 2. ./cacheai.json
    ///
    /// Returns error if no configuration file is found.
    pub fn load_default() -> Result<Self> {
        for path in default_config_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        anyhow::bail!(
            "Configuration file not found. Please create one at:\n\
             - ~/.config/cacheai/{name} (recommended)\n\
             - ./{name} (current directory)\n\
             or set CACHEAI_API_KEY in the environment.",
            name = CONFIG_FILE_NAME
        )
    }
}

/// Candidate configuration file locations, in search order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("cacheai").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}
