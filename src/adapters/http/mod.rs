//! HTTP adapters - Inbound endpoints.

pub mod webhook;

pub use webhook::{webhook_routes, WebhookAppState};
