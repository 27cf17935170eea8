//! Axum router configuration for the webhook endpoint.

use axum::{routing::post, Router};

use super::handlers::{receive_delivery, WebhookAppState};

/// Create the webhook router.
///
/// The route is unauthenticated at the HTTP layer; every delivery is
/// verified by its HMAC signature instead.
///
/// # Routes
/// - `POST {path}` - Receive EventSub deliveries
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(webhook_routes("/webhooks/eventsub"))
///     .with_state(state);
/// ```
pub fn webhook_routes(path: &str) -> Router<WebhookAppState> {
    Router::new().route(path, post(receive_delivery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::NotificationQueue;
    use crate::adapters::replay::InMemoryReplayGuard;
    use crate::domain::eventsub::{
        sign_delivery, NotificationDecoder, SignatureVerifier, HEADER_MESSAGE_ID,
        HEADER_MESSAGE_SIGNATURE, HEADER_MESSAGE_TIMESTAMP, HEADER_MESSAGE_TYPE,
        HEADER_SUBSCRIPTION_TYPE,
    };
    use crate::domain::foundation::Timestamp;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";
    const PATH: &str = "/webhooks/eventsub";

    fn app(queue: NotificationQueue) -> Router {
        let state = WebhookAppState {
            verifier: Arc::new(SignatureVerifier::new(SecretString::new(SECRET.to_string()))),
            replay_guard: Arc::new(InMemoryReplayGuard::default()),
            decoder: Arc::new(NotificationDecoder::new()),
            publisher: Arc::new(queue),
        };
        webhook_routes(PATH).with_state(state)
    }

    fn subscription_json() -> serde_json::Value {
        json!({
            "id": "f1c2a387-161a-49f9-a165-0f21d7a4e1c4",
            "status": "webhook_callback_verification_pending",
            "type": "channel.follow",
            "version": "1",
            "condition": { "broadcaster_user_id": "12826" },
            "transport": { "method": "webhook", "callback": "https://example.com/webhooks/eventsub" },
            "created_at": "2019-11-16T10:11:12.123Z"
        })
    }

    fn signed_request(message_id: &str, message_type: &str, event_type: &str, body: String) -> Request<Body> {
        let timestamp = Timestamp::now().to_rfc3339();
        let signature = sign_delivery(SECRET, message_id, &timestamp, body.as_bytes()).unwrap();
        Request::builder()
            .method("POST")
            .uri(PATH)
            .header(HEADER_MESSAGE_ID, message_id)
            .header(HEADER_MESSAGE_TIMESTAMP, timestamp)
            .header(HEADER_MESSAGE_TYPE, message_type)
            .header(HEADER_SUBSCRIPTION_TYPE, event_type)
            .header(HEADER_MESSAGE_SIGNATURE, signature)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn challenge_is_echoed_as_plain_text() {
        let (queue, _rx) = NotificationQueue::bounded(1);
        let body = json!({ "challenge": "abc123", "subscription": subscription_json() }).to_string();

        let response = app(queue)
            .oneshot(signed_request("msg-1", "webhook_callback_verification", "channel.follow", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, "abc123");
    }

    #[tokio::test]
    async fn notification_is_queued() {
        let (queue, mut rx) = NotificationQueue::bounded(1);
        let body = json!({
            "subscription": subscription_json(),
            "event": {
                "user_id": "1234",
                "user_login": "cool_user",
                "user_name": "Cool_User",
                "broadcaster_user_id": "12826",
                "broadcaster_user_login": "twitch",
                "broadcaster_user_name": "Twitch",
                "followed_at": "2020-07-15T18:16:11.17106713Z"
            }
        })
        .to_string();

        let response = app(queue)
            .oneshot(signed_request("msg-1", "notification", "channel.follow", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
        assert_eq!(rx.recv().await.unwrap().message_id.as_str(), "msg-1");
    }

    #[tokio::test]
    async fn bad_signature_is_forbidden() {
        let (queue, _rx) = NotificationQueue::bounded(1);
        let mut request = signed_request("msg-1", "notification", "channel.follow", "{}".to_string());
        request.headers_mut().insert(
            HEADER_MESSAGE_SIGNATURE,
            format!("sha256={}", "ab".repeat(32)).parse().unwrap(),
        );

        let response = app(queue).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_header_is_bad_request() {
        let (queue, _rx) = NotificationQueue::bounded(1);
        let mut request = signed_request("msg-1", "notification", "channel.follow", "{}".to_string());
        request.headers_mut().remove(HEADER_MESSAGE_TIMESTAMP);

        let response = app(queue).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn undecodable_notification_is_acknowledged() {
        let (queue, _rx) = NotificationQueue::bounded(1);
        let body = json!({ "subscription": subscription_json(), "event": { "user_id": 5 } }).to_string();

        let response = app(queue)
            .oneshot(signed_request("msg-1", "notification", "channel.follow", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn closed_queue_is_server_error() {
        let (queue, mut rx) = NotificationQueue::bounded(1);
        rx.close();
        let body = json!({
            "subscription": subscription_json(),
            "event": {
                "broadcaster_user_id": "12826",
                "broadcaster_user_login": "twitch",
                "broadcaster_user_name": "Twitch"
            }
        })
        .to_string();

        let response = app(queue)
            .oneshot(signed_request("msg-1", "notification", "stream.offline", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
