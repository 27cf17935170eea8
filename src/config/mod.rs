//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `EVENTSUB_GATEWAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use eventsub_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod helix;
mod server;
mod webhook;

pub use error::{ConfigError, ValidationError};
pub use helix::HelixConfig;
pub use server::{Environment, ServerConfig, MAX_REQUEST_TIMEOUT_SECS};
pub use webhook::{WebhookConfig, MAX_MESSAGE_AGE_SECS};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Webhook ingress (secret, replay window, dispatch bounds)
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Outbound REST API credentials
    #[serde(default)]
    pub helix: HelixConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `EVENTSUB_GATEWAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `EVENTSUB_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EVENTSUB_GATEWAY__WEBHOOK__SECRET=...` -> `webhook.secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EVENTSUB_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.webhook.validate(&self.server.environment)?;
        self.helix.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "EVENTSUB_GATEWAY__SERVER__PORT",
        "EVENTSUB_GATEWAY__SERVER__ENVIRONMENT",
        "EVENTSUB_GATEWAY__WEBHOOK__SECRET",
        "EVENTSUB_GATEWAY__WEBHOOK__PERMISSIVE",
        "EVENTSUB_GATEWAY__WEBHOOK__QUEUE_CAPACITY",
        "EVENTSUB_GATEWAY__WEBHOOK__MAX_CONCURRENT_HANDLERS",
        "EVENTSUB_GATEWAY__HELIX__CLIENT_ID",
        "EVENTSUB_GATEWAY__HELIX__ACCESS_TOKEN",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.webhook.path, "/webhooks/eventsub");
        assert!(!config.helix.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_webhook_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVENTSUB_GATEWAY__WEBHOOK__SECRET", "from-env-secret");
        env::set_var("EVENTSUB_GATEWAY__WEBHOOK__QUEUE_CAPACITY", "16");
        env::set_var("EVENTSUB_GATEWAY__WEBHOOK__MAX_CONCURRENT_HANDLERS", "4");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.webhook.secret.expose_secret(), "from-env-secret");
        assert_eq!(config.webhook.queue_capacity, 16);
        assert_eq!(config.webhook.max_concurrent_handlers, Some(4));
    }

    #[test]
    fn test_load_helix_credentials() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVENTSUB_GATEWAY__HELIX__CLIENT_ID", "client-id");
        env::set_var("EVENTSUB_GATEWAY__HELIX__ACCESS_TOKEN", "token");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.helix.is_configured());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVENTSUB_GATEWAY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_permissive_production_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVENTSUB_GATEWAY__SERVER__ENVIRONMENT", "production");
        env::set_var("EVENTSUB_GATEWAY__WEBHOOK__PERMISSIVE", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::PermissiveInProduction)
        );
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVENTSUB_GATEWAY__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
