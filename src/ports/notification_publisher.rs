//! NotificationPublisher port - Interface for handing verified notifications
//! to the dispatch side.
//!
//! The request path publishes; it never runs handlers itself.

use async_trait::async_trait;

use crate::domain::eventsub::Notification;
use crate::domain::foundation::DomainError;

/// Port for publishing decoded notifications.
///
/// Implementations must ensure:
/// - Notifications are delivered in the order `publish` returned
/// - `publish` may wait for capacity but never drops silently
/// - A publisher that can no longer deliver returns `QueueClosed`
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, notification: Notification) -> Result<(), DomainError>;
}
