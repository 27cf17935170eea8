//! EventSub domain - webhook deliveries, the event catalogue, and verification.

mod decoder;
mod events;
mod message;
mod signature;
mod subscription;
mod webhook_errors;

pub use decoder::{ChallengeMessage, DecodeError, Notification, NotificationDecoder};
pub use events::*;
pub use message::{
    InboundDelivery, MessageType, HEADER_MESSAGE_ID, HEADER_MESSAGE_SIGNATURE,
    HEADER_MESSAGE_TIMESTAMP, HEADER_MESSAGE_TYPE, HEADER_SUBSCRIPTION_TYPE,
};
pub use signature::{
    sign_delivery, SignatureHeader, SignatureVerifier, DEFAULT_MAX_MESSAGE_AGE_SECS,
};
pub use subscription::{
    generate_secret, Condition, Subscription, TransportOpts, SUBSCRIPTION_VERSION,
    WEBHOOK_TRANSPORT,
};
pub use webhook_errors::WebhookError;
