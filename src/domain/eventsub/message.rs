//! Inbound webhook delivery and its header vocabulary.

use std::fmt;

use super::webhook_errors::WebhookError;
use crate::domain::foundation::MessageId;

/// Header carrying the unique identifier of the delivery.
pub const HEADER_MESSAGE_ID: &str = "twitch-eventsub-message-id";
/// Header carrying the RFC3339 time the sender signed the delivery.
pub const HEADER_MESSAGE_TIMESTAMP: &str = "twitch-eventsub-message-timestamp";
/// Header declaring the message kind (challenge, notification, ...).
pub const HEADER_MESSAGE_TYPE: &str = "twitch-eventsub-message-type";
/// Header naming the event-type tag of the subscription.
pub const HEADER_SUBSCRIPTION_TYPE: &str = "twitch-eventsub-subscription-type";
/// Header carrying `sha256=<hex>` HMAC of the delivery.
pub const HEADER_MESSAGE_SIGNATURE: &str = "twitch-eventsub-message-signature";

/// Top-level message kind declared by the message type header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// One-time ownership handshake; the challenge must be echoed back.
    Challenge,
    /// An event notification to decode and dispatch.
    Notification,
    /// Anything else (including `revocation`); acknowledged and ignored.
    Other(String),
}

impl MessageType {
    pub fn parse(value: &str) -> Self {
        match value {
            "webhook_callback_verification" => MessageType::Challenge,
            "notification" => MessageType::Notification,
            other => MessageType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Challenge => "webhook_callback_verification",
            MessageType::Notification => "notification",
            MessageType::Other(other) => other,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One webhook request, as received.
///
/// Constructed per request and consumed by the delivery pipeline. The
/// timestamp is kept in its raw header form because the signature covers
/// the exact bytes the sender transmitted.
#[derive(Debug, Clone)]
pub struct InboundDelivery {
    pub message_id: MessageId,
    pub message_type: MessageType,
    pub event_type: String,
    pub timestamp: String,
    pub signature: String,
    pub body: Vec<u8>,
}

impl InboundDelivery {
    /// Builds a delivery from a header lookup function and the raw body.
    ///
    /// The event-type header is only required for notifications; the
    /// other four headers are required for every delivery.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingHeader` naming the first absent header.
    pub fn from_headers<'a, F>(header: F, body: Vec<u8>) -> Result<Self, WebhookError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let required = |name: &'static str| {
            header(name)
                .map(str::to_string)
                .ok_or(WebhookError::MissingHeader(name))
        };

        let message_id = MessageId::new(required(HEADER_MESSAGE_ID)?)
            .map_err(|_| WebhookError::MissingHeader(HEADER_MESSAGE_ID))?;
        let timestamp = required(HEADER_MESSAGE_TIMESTAMP)?;
        let signature = required(HEADER_MESSAGE_SIGNATURE)?;
        let message_type = MessageType::parse(&required(HEADER_MESSAGE_TYPE)?);

        let event_type = match message_type {
            MessageType::Notification => required(HEADER_SUBSCRIPTION_TYPE)?,
            _ => header(HEADER_SUBSCRIPTION_TYPE).unwrap_or_default().to_string(),
        };

        Ok(Self {
            message_id,
            message_type,
            event_type,
            timestamp,
            signature,
            body,
        })
    }
}
