//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Webhook path must start with '/'")]
    InvalidWebhookPath,

    #[error("Permissive signature checking is not allowed in production")]
    PermissiveInProduction,

    #[error("Duration must be greater than zero: {0}")]
    ZeroDuration(&'static str),

    #[error("{field} exceeds the maximum of {max_secs} seconds")]
    DurationTooLarge { field: &'static str, max_secs: u64 },

    #[error("Queue capacity must be at least 1")]
    InvalidQueueCapacity,

    #[error("Handler concurrency limit must be at least 1")]
    InvalidConcurrencyLimit,

    #[error("Callback host must use HTTPS")]
    CallbackHostMustBeHttps,

    #[error("Invalid API base URL")]
    InvalidApiBaseUrl,
}
