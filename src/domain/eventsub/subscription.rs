//! Subscription metadata shared by challenges, notifications, and the REST API.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::EventKind;
use crate::domain::foundation::SubscriptionId;

/// Length of generated shared secrets. The remote side accepts 10..=100.
const SECRET_LENGTH: usize = 49;

/// Transport method used for every subscription this gateway creates.
pub const WEBHOOK_TRANSPORT: &str = "webhook";

/// Subscription version requested for all event types.
pub const SUBSCRIPTION_VERSION: &str = "1";

/// Generates a random URL-safe shared secret for signing deliveries.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 100];
    rand::thread_rng().fill(&mut bytes[..]);
    let mut encoded = URL_SAFE.encode(bytes);
    encoded.truncate(SECRET_LENGTH);
    encoded
}

/// Where and how the remote side delivers notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOpts {
    pub method: String,
    pub callback: String,
    /// Only present on requests; never echoed back by the remote side.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

impl TransportOpts {
    /// Builds webhook transport options from a public host and a route path.
    pub fn webhook(callback_host: &str, path: &str, secret: impl Into<String>) -> Self {
        let callback = format!(
            "{}/{}",
            callback_host.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Self {
            method: WEBHOOK_TRANSPORT.to_string(),
            callback,
            secret: secret.into(),
        }
    }
}

/// Filter a subscription applies on the remote side.
///
/// Each event type uses a subset of these fields; absent fields are
/// omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Condition {
    pub fn broadcaster(broadcaster_user_id: impl Into<String>) -> Self {
        Self {
            broadcaster_user_id: Some(broadcaster_user_id.into()),
            ..Self::default()
        }
    }

    pub fn raid_to(broadcaster_user_id: impl Into<String>) -> Self {
        Self {
            to_broadcaster_user_id: Some(broadcaster_user_id.into()),
            ..Self::default()
        }
    }

    pub fn raid_from(broadcaster_user_id: impl Into<String>) -> Self {
        Self {
            from_broadcaster_user_id: Some(broadcaster_user_id.into()),
            ..Self::default()
        }
    }

    pub fn reward(broadcaster_user_id: impl Into<String>, reward_id: impl Into<String>) -> Self {
        Self {
            broadcaster_user_id: Some(broadcaster_user_id.into()),
            reward_id: Some(reward_id.into()),
            ..Self::default()
        }
    }

    pub fn client(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }
}

/// Subscription metadata as carried by every delivery and API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "SubscriptionId::is_empty")]
    pub id: SubscriptionId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub version: String,
    #[serde(default)]
    pub condition: Condition,
    pub transport: TransportOpts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Builds a subscription request for the given event type.
    pub fn request(kind: EventKind, condition: Condition, transport: TransportOpts) -> Self {
        Self {
            id: SubscriptionId::default(),
            status: String::new(),
            event_type: kind.as_str().to_string(),
            version: SUBSCRIPTION_VERSION.to_string(),
            condition,
            transport,
            created_at: None,
        }
    }

    /// Returns the catalogued event kind, if the type is one we decode.
    pub fn kind(&self) -> Option<EventKind> {
        self.event_type.parse().ok()
    }
}
