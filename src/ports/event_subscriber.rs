//! EventSubscriber port - Interface for registering notification handlers.
//!
//! This port defines how callers register interest in event types without
//! knowing how notifications reach the process.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::eventsub::{EventKind, Notification};
use crate::domain::foundation::DomainError;

/// Handler for processing decoded notifications.
///
/// Implementations should be:
/// - **Read-only** - The notification is shared with every other handler
/// - **Quick** - Long operations should be moved off the handler task
/// - **Isolated** - Errors are logged by the dispatcher and go no further
///
/// # Example
///
/// ```ignore
/// struct GoLiveAnnouncer { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for GoLiveAnnouncer {
///     async fn handle(&self, notification: Arc<Notification>) -> Result<(), DomainError> {
///         if let TypedEvent::StreamOnline(online) = &notification.event {
///             // Announce...
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "GoLiveAnnouncer"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one notification.
    async fn handle(&self, notification: Arc<Notification>) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for registering handlers against event kinds.
///
/// Registrations are append-only; there is no way to remove a handler.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe(EventKind::StreamOnline, announcer);
/// subscriber.subscribe_all(&[EventKind::ChannelBan, EventKind::ChannelUnban], mod_log);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event kind.
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler instance to several event kinds.
    fn subscribe_all(&self, kinds: &[EventKind], handler: Arc<dyn EventHandler>) {
        for kind in kinds {
            self.subscribe(*kind, Arc::clone(&handler));
        }
    }
}
