//! Helix API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::helix::DEFAULT_API_BASE_URL;

/// Credentials and endpoint for the outbound REST API
#[derive(Debug, Clone, Deserialize)]
pub struct HelixConfig {
    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Application client id
    #[serde(default)]
    pub client_id: String,

    /// App access token (acquired out of band)
    #[serde(default = "empty_secret")]
    pub access_token: SecretString,
}

impl HelixConfig {
    /// Check if API credentials are present
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.access_token.expose_secret().is_empty()
    }

    /// Validate Helix configuration
    ///
    /// Credentials are optional, but must be given together.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        let has_token = !self.access_token.expose_secret().is_empty();
        match (self.client_id.is_empty(), has_token) {
            (false, false) => Err(ValidationError::MissingRequired("HELIX__ACCESS_TOKEN")),
            (true, true) => Err(ValidationError::MissingRequired("HELIX__CLIENT_ID")),
            _ => Ok(()),
        }
    }
}

impl Default for HelixConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            client_id: String::new(),
            access_token: empty_secret(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}
