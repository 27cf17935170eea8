//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Handler registry, notification queue, and dispatcher
//! - `helix` - REST client for subscription management and lookups
//! - `http` - Axum webhook endpoint
//! - `replay` - In-memory replay guard with background sweeping

pub mod events;
pub mod helix;
pub mod http;
pub mod replay;

pub use events::{Dispatcher, DispatcherConfig, HandlerRegistry, NotificationQueue, QueueReceiver};
pub use helix::HelixClient;
pub use replay::InMemoryReplayGuard;
