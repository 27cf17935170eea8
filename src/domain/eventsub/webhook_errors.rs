//! Webhook error types for EventSub delivery handling.
//!
//! Defines every outcome of the delivery pipeline that is not a plain
//! success, with the HTTP status code the sender should see.

use axum::http::StatusCode;
use thiserror::Error;

use super::decoder::DecodeError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A required delivery header is absent or empty.
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// The timestamp header is not RFC3339.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The delivery is older than the accepted window.
    #[error("Stale timestamp")]
    StaleTimestamp,

    /// HMAC digest missing, malformed, or mismatched.
    #[error("Bad signature")]
    BadSignature,

    /// The message id was already accepted within the replay window.
    #[error("Duplicate delivery")]
    DuplicateDelivery,

    /// The event-type tag is not in the catalogue.
    #[error("Unknown event type: {0}")]
    UnknownType(String),

    /// The payload does not match the shape of its event type.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A verified challenge body could not be read.
    #[error("Marshalling error: {0}")]
    Marshalling(String),

    /// The dispatch queue is shut down.
    #[error("Notification queue closed")]
    QueueClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns true if the sender should treat the delivery as handled.
    ///
    /// Duplicates and undecodable payloads are acknowledged so the sender
    /// does not retry a payload this gateway will never accept.
    pub fn should_acknowledge(&self) -> bool {
        self.status_code() == StatusCode::OK
    }

    /// Maps the error to the HTTP status code returned to the sender.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::BadSignature => StatusCode::FORBIDDEN,

            WebhookError::MissingHeader(_)
            | WebhookError::InvalidTimestamp(_)
            | WebhookError::StaleTimestamp => StatusCode::BAD_REQUEST,

            WebhookError::DuplicateDelivery
            | WebhookError::UnknownType(_)
            | WebhookError::MalformedPayload(_) => StatusCode::OK,

            WebhookError::Marshalling(_)
            | WebhookError::QueueClosed
            | WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DecodeError> for WebhookError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownType(event_type) => WebhookError::UnknownType(event_type),
            malformed @ DecodeError::Malformed { .. } => {
                WebhookError::MalformedPayload(malformed.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn bad_signature_displays_correctly() {
        assert_eq!(format!("{}", WebhookError::BadSignature), "Bad signature");
    }

    #[test]
    fn missing_header_displays_header_name() {
        let err = WebhookError::MissingHeader("twitch-eventsub-message-id");
        assert_eq!(format!("{}", err), "Missing header: twitch-eventsub-message-id");
    }

    #[test]
    fn unknown_type_displays_tag() {
        let err = WebhookError::UnknownType("channel.poll.begin".to_string());
        assert_eq!(format!("{}", err), "Unknown event type: channel.poll.begin");
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn bad_signature_is_forbidden() {
        assert_eq!(WebhookError::BadSignature.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn window_and_header_problems_are_bad_request() {
        assert_eq!(WebhookError::StaleTimestamp.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::InvalidTimestamp("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingHeader("x").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn duplicates_and_decode_failures_are_acknowledged() {
        assert!(WebhookError::DuplicateDelivery.should_acknowledge());
        assert!(WebhookError::UnknownType("x".into()).should_acknowledge());
        assert!(WebhookError::MalformedPayload("x".into()).should_acknowledge());
    }

    #[test]
    fn internal_failures_are_server_errors() {
        assert_eq!(
            WebhookError::Marshalling("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::QueueClosed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!WebhookError::QueueClosed.should_acknowledge());
    }

    #[test]
    fn decode_errors_convert() {
        let unknown: WebhookError = DecodeError::UnknownType("x.y".into()).into();
        assert!(matches!(unknown, WebhookError::UnknownType(ref t) if t == "x.y"));

        let malformed: WebhookError = DecodeError::Malformed {
            event_type: "stream.online".into(),
            reason: "missing field `id`".into(),
        }
        .into();
        assert!(matches!(malformed, WebhookError::MalformedPayload(_)));
    }
}
