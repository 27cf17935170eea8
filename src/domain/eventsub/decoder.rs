//! Type-routed decoding of notification payloads.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::value::RawValue;
use thiserror::Error;

use super::events::{EventKind, TypedEvent};
use super::subscription::Subscription;
use crate::domain::foundation::MessageId;

/// Why a notification could not be turned into a `TypedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The event-type tag is not in the routing table.
    #[error("unknown event type: {0}")]
    UnknownType(String),

    /// The tag is known but the payload does not have its shape.
    #[error("malformed {event_type} payload: {reason}")]
    Malformed { event_type: String, reason: String },
}

impl DecodeError {
    fn malformed(event_type: impl Into<String>, err: impl ToString) -> Self {
        DecodeError::Malformed {
            event_type: event_type.into(),
            reason: err.to_string(),
        }
    }
}

/// Body of a `webhook_callback_verification` message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeMessage {
    pub challenge: String,
    pub subscription: Subscription,
}

/// Raw notification body; the event stays undecoded until routed.
#[derive(Debug, Deserialize)]
struct RawNotification<'a> {
    subscription: Subscription,
    #[serde(borrow)]
    event: &'a RawValue,
}

/// A verified, decoded notification ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message_id: MessageId,
    pub subscription: Subscription,
    pub event: TypedEvent,
}

impl Notification {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

type DecodeFn = fn(&str) -> Result<TypedEvent, serde_json::Error>;

/// Fixed routing table from event-type tag to payload decoder.
pub struct NotificationDecoder {
    routes: HashMap<&'static str, DecodeFn>,
}

impl NotificationDecoder {
    pub fn new() -> Self {
        let entries: [(EventKind, DecodeFn); 19] = [
            (EventKind::ChannelUpdate, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelUpdate)
            }),
            (EventKind::ChannelFollow, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelFollow)
            }),
            (EventKind::ChannelSubscribe, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelSubscribe)
            }),
            (EventKind::ChannelCheer, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelCheer)
            }),
            (EventKind::ChannelRaid, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelRaid)
            }),
            (EventKind::ChannelBan, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelBan)
            }),
            (EventKind::ChannelUnban, |raw| {
                serde_json::from_str(raw).map(TypedEvent::ChannelUnban)
            }),
            (EventKind::CustomRewardAdd, |raw| {
                serde_json::from_str(raw).map(TypedEvent::CustomRewardAdd)
            }),
            (EventKind::CustomRewardUpdate, |raw| {
                serde_json::from_str(raw).map(TypedEvent::CustomRewardUpdate)
            }),
            (EventKind::CustomRewardRemove, |raw| {
                serde_json::from_str(raw).map(TypedEvent::CustomRewardRemove)
            }),
            (EventKind::RedemptionAdd, |raw| {
                serde_json::from_str(raw).map(TypedEvent::RedemptionAdd)
            }),
            (EventKind::RedemptionUpdate, |raw| {
                serde_json::from_str(raw).map(TypedEvent::RedemptionUpdate)
            }),
            (EventKind::HypeTrainBegin, |raw| {
                serde_json::from_str(raw).map(TypedEvent::HypeTrainBegin)
            }),
            (EventKind::HypeTrainProgress, |raw| {
                serde_json::from_str(raw).map(TypedEvent::HypeTrainProgress)
            }),
            (EventKind::HypeTrainEnd, |raw| {
                serde_json::from_str(raw).map(TypedEvent::HypeTrainEnd)
            }),
            (EventKind::StreamOnline, |raw| {
                serde_json::from_str(raw).map(TypedEvent::StreamOnline)
            }),
            (EventKind::StreamOffline, |raw| {
                serde_json::from_str(raw).map(TypedEvent::StreamOffline)
            }),
            (EventKind::UserAuthorizationRevoke, |raw| {
                serde_json::from_str(raw).map(TypedEvent::UserAuthorizationRevoke)
            }),
            (EventKind::UserUpdate, |raw| {
                serde_json::from_str(raw).map(TypedEvent::UserUpdate)
            }),
        ];

        Self {
            routes: entries
                .into_iter()
                .map(|(kind, decode)| (kind.as_str(), decode))
                .collect(),
        }
    }

    /// Decodes a raw event payload according to its tag.
    pub fn decode(&self, event_type: &str, raw_event: &str) -> Result<TypedEvent, DecodeError> {
        let decode = self
            .routes
            .get(event_type)
            .ok_or_else(|| DecodeError::UnknownType(event_type.to_string()))?;

        decode(raw_event).map_err(|e| DecodeError::malformed(event_type, e))
    }

    /// Decodes a full notification body `{subscription, event}`.
    ///
    /// The tag comes from the delivery header, not the payload. An unknown
    /// tag is reported before the body is parsed.
    pub fn decode_notification(
        &self,
        message_id: MessageId,
        event_type: &str,
        body: &[u8],
    ) -> Result<Notification, DecodeError> {
        if !self.routes.contains_key(event_type) {
            return Err(DecodeError::UnknownType(event_type.to_string()));
        }

        let raw: RawNotification<'_> =
            serde_json::from_slice(body).map_err(|e| DecodeError::malformed(event_type, e))?;
        let event = self.decode(event_type, raw.event.get())?;

        Ok(Notification {
            message_id,
            subscription: raw.subscription,
            event,
        })
    }
}

impl Default for NotificationDecoder {
    fn default() -> Self {
        Self::new()
    }
}
