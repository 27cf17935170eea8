//! Webhook ingress configuration

use serde::Deserialize;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::replay::{MAX_REPLAY_TTL, MAX_SWEEP_INTERVAL};
use crate::domain::eventsub::{generate_secret, DEFAULT_MAX_MESSAGE_AGE_SECS};

/// Largest accepted delivery age (1 day).
pub const MAX_MESSAGE_AGE_SECS: u64 = 24 * 60 * 60;

/// Webhook configuration (signature checks, replay window, dispatch)
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Route the sender posts deliveries to
    #[serde(default = "default_path")]
    pub path: String,

    /// Shared HMAC secret; generated at startup when empty
    #[serde(default = "empty_secret")]
    pub secret: SecretString,

    /// Skip timestamp and signature checks (local testing only)
    #[serde(default)]
    pub permissive: bool,

    /// Oldest accepted delivery, in seconds
    #[serde(default = "default_max_message_age")]
    pub max_message_age_secs: u64,

    /// How long accepted message ids are remembered, in seconds
    #[serde(default = "default_replay_ttl")]
    pub replay_ttl_secs: u64,

    /// Cadence of the replay cache sweep, in seconds
    #[serde(default = "default_replay_sweep_interval")]
    pub replay_sweep_interval_secs: u64,

    /// Notifications buffered between requests and the dispatch loop
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Upper bound on concurrently running handlers; unbounded when unset
    pub max_concurrent_handlers: Option<usize>,

    /// Public base URL the sender reaches this service on
    pub callback_host: Option<String>,
}

impl WebhookConfig {
    /// Returns the configured secret, or a freshly generated one.
    pub fn resolve_secret(&self) -> SecretString {
        if self.secret.expose_secret().is_empty() {
            tracing::info!("No webhook secret configured; generated a random one");
            SecretString::new(generate_secret())
        } else {
            self.secret.clone()
        }
    }

    pub fn max_message_age(&self) -> Duration {
        Duration::from_secs(self.max_message_age_secs)
    }

    /// Delivery age window for signature verification.
    pub fn signature_window(&self) -> Result<chrono::Duration, ValidationError> {
        self.validate_durations()?;
        chrono::Duration::from_std(self.max_message_age()).map_err(|_| {
            ValidationError::DurationTooLarge {
                field: "max_message_age_secs",
                max_secs: MAX_MESSAGE_AGE_SECS,
            }
        })
    }

    pub fn replay_ttl(&self) -> Duration {
        Duration::from_secs(self.replay_ttl_secs)
    }

    pub fn replay_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.replay_sweep_interval_secs)
    }

    /// Validate webhook configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::InvalidWebhookPath);
        }
        if self.permissive && *environment == Environment::Production {
            return Err(ValidationError::PermissiveInProduction);
        }
        self.validate_durations()?;
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.max_concurrent_handlers == Some(0) {
            return Err(ValidationError::InvalidConcurrencyLimit);
        }
        if let Some(host) = &self.callback_host {
            if !host.starts_with("https://") {
                return Err(ValidationError::CallbackHostMustBeHttps);
            }
        }
        Ok(())
    }

    /// Checks every duration is non-zero and within its upper bound.
    pub fn validate_durations(&self) -> Result<(), ValidationError> {
        let bounds = [
            ("max_message_age_secs", self.max_message_age_secs, MAX_MESSAGE_AGE_SECS),
            ("replay_ttl_secs", self.replay_ttl_secs, MAX_REPLAY_TTL.as_secs()),
            (
                "replay_sweep_interval_secs",
                self.replay_sweep_interval_secs,
                MAX_SWEEP_INTERVAL.as_secs(),
            ),
        ];
        for (field, value, max_secs) in bounds {
            if value == 0 {
                return Err(ValidationError::ZeroDuration(field));
            }
            if value > max_secs {
                return Err(ValidationError::DurationTooLarge { field, max_secs });
            }
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            secret: empty_secret(),
            permissive: false,
            max_message_age_secs: default_max_message_age(),
            replay_ttl_secs: default_replay_ttl(),
            replay_sweep_interval_secs: default_replay_sweep_interval(),
            queue_capacity: default_queue_capacity(),
            max_concurrent_handlers: None,
            callback_host: None,
        }
    }
}

fn default_path() -> String {
    "/webhooks/eventsub".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_max_message_age() -> u64 {
    DEFAULT_MAX_MESSAGE_AGE_SECS as u64
}

fn default_replay_ttl() -> u64 {
    24 * 60 * 60
}

fn default_replay_sweep_interval() -> u64 {
    60 * 60
}

fn default_queue_capacity() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_config_defaults() {
        let config = WebhookConfig::default();
        assert_eq!(config.path, "/webhooks/eventsub");
        assert!(!config.permissive);
        assert_eq!(config.max_message_age(), Duration::from_secs(600));
        assert_eq!(config.replay_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.replay_sweep_interval(), Duration::from_secs(3_600));
        assert_eq!(config.queue_capacity, 1);
        assert!(config.max_concurrent_handlers.is_none());
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_configured_secret_is_kept() {
        let config = WebhookConfig {
            secret: SecretString::new("configured-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().expose_secret(), "configured-secret");
    }

    #[test]
    fn test_empty_secret_is_generated() {
        let secret = WebhookConfig::default().resolve_secret();
        assert_eq!(secret.expose_secret().len(), 49);
    }

    #[test]
    fn test_permissive_rejected_in_production() {
        let config = WebhookConfig {
            permissive: true,
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::PermissiveInProduction)
        );
    }

    #[test]
    fn test_validation_path_must_be_absolute() {
        let config = WebhookConfig {
            path: "webhooks".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidWebhookPath)
        );
    }

    #[test]
    fn test_validation_zero_values() {
        let config = WebhookConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidQueueCapacity)
        );

        let config = WebhookConfig {
            max_concurrent_handlers: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidConcurrencyLimit)
        );

        let config = WebhookConfig {
            replay_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::ZeroDuration("replay_ttl_secs"))
        );
    }

    #[test]
    fn test_validation_duration_upper_bounds() {
        let config = WebhookConfig {
            max_message_age_secs: 100_000_000_000_000_000,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::DurationTooLarge {
                field: "max_message_age_secs",
                max_secs: MAX_MESSAGE_AGE_SECS,
            })
        );

        let config = WebhookConfig {
            replay_ttl_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::DurationTooLarge {
                field: "replay_ttl_secs",
                max_secs: MAX_REPLAY_TTL.as_secs(),
            })
        );

        let config = WebhookConfig {
            replay_sweep_interval_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::DurationTooLarge {
                field: "replay_sweep_interval_secs",
                max_secs: MAX_SWEEP_INTERVAL.as_secs(),
            })
        );
    }

    #[test]
    fn test_duration_limits_are_inclusive() {
        let config = WebhookConfig {
            max_message_age_secs: MAX_MESSAGE_AGE_SECS,
            replay_ttl_secs: MAX_REPLAY_TTL.as_secs(),
            replay_sweep_interval_secs: MAX_SWEEP_INTERVAL.as_secs(),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
        assert_eq!(
            config.signature_window(),
            Ok(chrono::Duration::seconds(MAX_MESSAGE_AGE_SECS as i64))
        );
    }

    #[test]
    fn test_signature_window_rejects_out_of_range_age() {
        let config = WebhookConfig {
            max_message_age_secs: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.signature_window(),
            Err(ValidationError::DurationTooLarge { .. })
        ));
    }

    #[test]
    fn test_validation_callback_host_requires_https() {
        let config = WebhookConfig {
            callback_host: Some("http://example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::CallbackHostMustBeHttps)
        );
    }
}
