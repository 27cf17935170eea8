//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Delivery Ports
//!
//! - `ReplayGuard` - Time-bounded de-duplication of message ids
//! - `EventSubscriber` - Registration of handlers per event kind
//! - `EventHandler` - Handler that processes decoded notifications
//! - `NotificationPublisher` - Hand-off from the request path to dispatch
//!
//! ## Remote API Ports
//!
//! - `PageSource` - One page of a cursor-paginated collection
//! - `EventSubApi` - Subscription management and resource lookups

mod event_subscriber;
mod eventsub_api;
mod notification_publisher;
mod page_source;
mod replay_guard;

pub use event_subscriber::{EventHandler, EventSubscriber};
pub use eventsub_api::EventSubApi;
pub use notification_publisher::NotificationPublisher;
pub use page_source::{ApiError, CursorPage, PageSource, PaginationCursor};
pub use replay_guard::{Observation, ReplayGuard};
