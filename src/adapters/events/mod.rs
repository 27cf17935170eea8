//! Notification dispatch adapters.
//!
//! - `HandlerRegistry` - Handlers keyed by event kind
//! - `NotificationQueue` - Bounded FIFO between webhook requests and dispatch
//! - `Dispatcher` - Background loop fanning notifications out to handlers

mod dispatcher;
mod handler_registry;
mod notification_queue;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use handler_registry::HandlerRegistry;
pub use notification_queue::{NotificationQueue, QueueReceiver};
