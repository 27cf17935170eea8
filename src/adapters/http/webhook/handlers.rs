//! HTTP handler for webhook deliveries.
//!
//! Connects the axum route to `HandleDeliveryHandler` and maps pipeline
//! outcomes to the status codes the sender expects.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{
    HandleDeliveryCommand, HandleDeliveryHandler, HandleDeliveryResult,
};
use crate::domain::eventsub::{InboundDelivery, NotificationDecoder, SignatureVerifier, WebhookError};
use crate::ports::{NotificationPublisher, ReplayGuard};

use super::dto::ErrorResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook route.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<SignatureVerifier>,
    pub replay_guard: Arc<dyn ReplayGuard>,
    pub decoder: Arc<NotificationDecoder>,
    pub publisher: Arc<dyn NotificationPublisher>,
}

impl WebhookAppState {
    pub fn delivery_handler(&self) -> HandleDeliveryHandler {
        HandleDeliveryHandler::new(
            self.verifier.clone(),
            self.replay_guard.clone(),
            self.decoder.clone(),
            self.publisher.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST {webhook path} - Receive one EventSub delivery
pub async fn receive_delivery(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookApiError> {
    let delivery = InboundDelivery::from_headers(
        |name: &str| headers.get(name).and_then(|v| v.to_str().ok()),
        body.to_vec(),
    )?;

    let result = state
        .delivery_handler()
        .handle(HandleDeliveryCommand { delivery })
        .await?;

    let response = match result {
        HandleDeliveryResult::Challenge { challenge } => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            challenge,
        )
            .into_response(),
        HandleDeliveryResult::Published { .. } | HandleDeliveryResult::Ignored { .. } => {
            StatusCode::OK.into_response()
        }
    };

    Ok(response)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts pipeline errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl WebhookApiError {
    fn error_code(&self) -> &'static str {
        match &self.0 {
            WebhookError::MissingHeader(_) => "MISSING_HEADER",
            WebhookError::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            WebhookError::StaleTimestamp => "STALE_TIMESTAMP",
            WebhookError::BadSignature => "BAD_SIGNATURE",
            WebhookError::DuplicateDelivery => "DUPLICATE_DELIVERY",
            WebhookError::UnknownType(_) => "UNKNOWN_TYPE",
            WebhookError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            WebhookError::Marshalling(_) => "MARSHALLING_ERROR",
            WebhookError::QueueClosed => "QUEUE_CLOSED",
            WebhookError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        // Acknowledged outcomes carry no body; the sender only reads the status.
        if self.0.should_acknowledge() {
            return StatusCode::OK.into_response();
        }

        let status = self.0.status_code();
        let message = match &self.0 {
            WebhookError::Marshalling(_) | WebhookError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(self.error_code(), message))).into_response()
    }
}
