//! ReplayGuard port - Interface for suppressing redelivered notifications.
//!
//! The sender delivers at least once and retries with the same message id.
//! The guard remembers accepted ids for a bounded window so a retry is
//! acknowledged without being dispatched a second time.

use async_trait::async_trait;

use crate::domain::foundation::MessageId;

/// Result of observing a message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting inside the window; the id is now recorded.
    Fresh,
    /// Already recorded; the entry is left untouched.
    Duplicate,
}

/// Port for time-bounded de-duplication of message ids.
///
/// `observe` must be atomic per id: two concurrent calls with the same id
/// yield exactly one `Fresh`. A duplicate never extends the window.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    async fn observe(&self, message_id: &MessageId) -> Observation;

    /// Forgets an id recorded by `observe`, so a retry of a delivery that
    /// failed after being recorded is treated as fresh.
    async fn release(&self, message_id: &MessageId);
}
