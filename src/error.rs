//! Error types for Gemchat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use crate::provider::ProviderError;
use thiserror::Error;

/// Main error type for Gemchat operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, and session storage.
#[derive(Error, Debug)]
pub enum GemchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, authentication, etc.)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Gemchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = GemchatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_storage_error_display() {
        let error = GemchatError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_provider_error_conversion() {
        let error: GemchatError = ProviderError::Network("connection refused".to_string()).into();
        assert!(matches!(error, GemchatError::Provider(_)));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: GemchatError = io_error.into();
        assert!(matches!(error, GemchatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: GemchatError = json_error.into();
        assert!(matches!(error, GemchatError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GemchatError>();
    }
}
