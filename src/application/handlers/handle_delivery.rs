//! HandleDeliveryHandler - Command handler for one inbound webhook delivery.

use std::sync::Arc;

use crate::domain::eventsub::{
    ChallengeMessage, EventKind, InboundDelivery, MessageType, NotificationDecoder,
    SignatureVerifier, WebhookError,
};
use crate::domain::foundation::{ErrorCode, MessageId};
use crate::ports::{NotificationPublisher, Observation, ReplayGuard};

/// Command to handle one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleDeliveryCommand {
    pub delivery: InboundDelivery,
}

/// Result of delivery processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleDeliveryResult {
    /// Verification handshake; the challenge is echoed back verbatim.
    Challenge { challenge: String },
    /// Notification decoded and handed to the dispatch queue.
    Published {
        message_id: MessageId,
        event_type: EventKind,
    },
    /// Authenticated delivery of a kind this gateway does not act on.
    Ignored { message_type: String },
}

/// Handler for inbound webhook deliveries.
///
/// Runs the verification pipeline in a fixed order: signature and
/// timestamp, then replay detection, then a branch on the message type.
/// Only authenticated deliveries ever reach the replay guard, and an id is
/// released again when processing fails with a server error.
pub struct HandleDeliveryHandler {
    verifier: Arc<SignatureVerifier>,
    replay_guard: Arc<dyn ReplayGuard>,
    decoder: Arc<NotificationDecoder>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl HandleDeliveryHandler {
    pub fn new(
        verifier: Arc<SignatureVerifier>,
        replay_guard: Arc<dyn ReplayGuard>,
        decoder: Arc<NotificationDecoder>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            verifier,
            replay_guard,
            decoder,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleDeliveryCommand,
    ) -> Result<HandleDeliveryResult, WebhookError> {
        let delivery = cmd.delivery;

        // 1. Authenticate
        let body = self
            .verifier
            .verify(
                delivery.message_id.as_str(),
                &delivery.timestamp,
                &delivery.body,
                &delivery.signature,
            )
            .map_err(|e| {
                tracing::warn!(
                    message_id = %delivery.message_id,
                    message_type = %delivery.message_type,
                    error = %e,
                    "Rejected delivery"
                );
                e
            })?;

        // 2. Replay detection
        if self.replay_guard.observe(&delivery.message_id).await == Observation::Duplicate {
            tracing::info!(
                message_id = %delivery.message_id,
                message_type = %delivery.message_type,
                "Duplicate delivery acknowledged"
            );
            return Err(WebhookError::DuplicateDelivery);
        }

        // 3. Branch on message type
        let outcome = self.process(&delivery, body).await;

        // 5xx outcomes are retried by the sender; forget the id.
        if let Err(e) = &outcome {
            if !e.should_acknowledge() {
                self.replay_guard.release(&delivery.message_id).await;
                tracing::debug!(
                    message_id = %delivery.message_id,
                    "Released message id for retry"
                );
            }
        }

        outcome
    }

    async fn process(
        &self,
        delivery: &InboundDelivery,
        body: &[u8],
    ) -> Result<HandleDeliveryResult, WebhookError> {
        match &delivery.message_type {
            MessageType::Challenge => {
                let message: ChallengeMessage = serde_json::from_slice(body)
                    .map_err(|e| WebhookError::Marshalling(e.to_string()))?;
                tracing::info!(
                    message_id = %delivery.message_id,
                    subscription_type = %message.subscription.event_type,
                    "Answering verification challenge"
                );
                Ok(HandleDeliveryResult::Challenge {
                    challenge: message.challenge,
                })
            }
            MessageType::Notification => {
                let notification = self
                    .decoder
                    .decode_notification(delivery.message_id.clone(), &delivery.event_type, body)
                    .map_err(|e| {
                        // Acknowledged with 200 by the HTTP layer.
                        tracing::warn!(
                            message_id = %delivery.message_id,
                            event_type = %delivery.event_type,
                            error = %e,
                            "Discarding undecodable notification"
                        );
                        WebhookError::from(e)
                    })?;

                let event_type = notification.kind();
                self.publisher.publish(notification).await.map_err(|e| {
                    tracing::error!(
                        message_id = %delivery.message_id,
                        event_type = %event_type,
                        error = %e,
                        "Failed to queue notification"
                    );
                    match e.code {
                        ErrorCode::QueueClosed => WebhookError::QueueClosed,
                        _ => WebhookError::Internal(e.to_string()),
                    }
                })?;

                tracing::debug!(
                    message_id = %delivery.message_id,
                    event_type = %event_type,
                    "Notification queued"
                );
                Ok(HandleDeliveryResult::Published {
                    message_id: delivery.message_id.clone(),
                    event_type,
                })
            }
            MessageType::Other(kind) => {
                tracing::info!(
                    message_id = %delivery.message_id,
                    message_type = %kind,
                    "Ignoring delivery of unhandled message type"
                );
                Ok(HandleDeliveryResult::Ignored {
                    message_type: kind.clone(),
                })
            }
        }
    }
}
