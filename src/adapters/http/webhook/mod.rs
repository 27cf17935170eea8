//! HTTP adapter for the EventSub webhook endpoint.
//!
//! Exposes a single route:
//! - `POST {path}` - Receive a signed delivery (challenge, notification, or other)

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::{receive_delivery, WebhookApiError, WebhookAppState};
pub use routes::webhook_routes;
