//! Helix domain - REST resources consumed alongside the webhook.

mod broadcaster;
mod resources;

pub use broadcaster::broadcaster_login;
pub use resources::{Stream, StreamFilter, SubscriptionFilter, User, MAX_USER_LOOKUP};
