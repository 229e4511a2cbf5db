//! Configuration management for Gemchat
//!
//! Loads configuration from a YAML file with sensible defaults, then applies
//! environment-variable and CLI overrides in that order (CLI wins).

use crate::error::{GemchatError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default model used when neither config file nor overrides name one
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API base URL for the Generative Language API
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini provider settings
    pub provider: GeminiConfig,
    /// Session storage settings
    pub storage: StorageConfig,
    /// Chat behavior settings
    pub chat: ChatConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier sent to the API
    pub model: String,
    /// Base URL of the API (overridable for testing)
    pub api_base: String,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit database path; empty string means the platform data dir
    pub db_path: String,
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Title given to sessions before the first exchange names them
    pub default_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: GeminiConfig::default(),
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: String::new(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: "New Chat".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GemchatError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// A missing file is not an error; defaults are used with a warning.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!(
                "Config file not found at {:?}, using defaults",
                path.as_ref()
            );
            Self::default()
        };

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// `GEMCHAT_MODEL` overrides the model; `GEMCHAT_HISTORY_DB` overrides
    /// the database path (the store also honors it directly).
    pub fn apply_env_vars(&mut self) {
        if let Ok(model) = std::env::var("GEMCHAT_MODEL") {
            if !model.is_empty() {
                tracing::debug!("Overriding model from GEMCHAT_MODEL: {}", model);
                self.provider.model = model;
            }
        }

        if let Ok(db_path) = std::env::var("GEMCHAT_HISTORY_DB") {
            if !db_path.is_empty() {
                self.storage.db_path = db_path;
            }
        }
    }

    /// Apply command-line overrides (these win over file and env)
    pub fn apply_cli_overrides(&mut self, model: Option<String>, storage_path: Option<String>) {
        if let Some(model) = model {
            self.provider.model = model;
        }
        if let Some(path) = storage_path {
            self.storage.db_path = path;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if required fields are empty or malformed
    pub fn validate(&self) -> Result<()> {
        if self.provider.model.is_empty() {
            return Err(GemchatError::Config("Model name cannot be empty".to_string()).into());
        }

        if self.provider.api_base.is_empty() {
            return Err(GemchatError::Config("API base URL cannot be empty".to_string()).into());
        }

        if !self.provider.api_base.starts_with("http://")
            && !self.provider.api_base.starts_with("https://")
        {
            return Err(GemchatError::Config(format!(
                "API base URL must start with http:// or https://: {}",
                self.provider.api_base
            ))
            .into());
        }

        if self.chat.default_title.is_empty() {
            return Err(
                GemchatError::Config("Default session title cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Read the API key from the environment
    ///
    /// Missing or empty keys yield None; startup proceeds and the provider
    /// reports the problem on first use.
    pub fn api_key() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
    }
}
