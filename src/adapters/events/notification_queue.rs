//! NotificationQueue - bounded FIFO between request handling and dispatch.
//!
//! With capacity 1 the queue behaves as a near-rendezvous: an enqueue waits
//! until the dispatch loop has taken the previous notification, so a stalled
//! loop back-pressures onto the webhook response.
//!
//! ## Shutdown
//!
//! Closing the receiving side rejects further enqueues (including ones
//! currently waiting for space) while notifications already accepted can
//! still be drained in order.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::eventsub::Notification;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::NotificationPublisher;

/// Sending half, cloned into every request handler.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<Notification>,
}

/// Receiving half, owned by the dispatch loop.
pub struct QueueReceiver {
    receiver: mpsc::Receiver<Notification>,
}

impl NotificationQueue {
    /// Creates a queue holding at most `capacity` notifications (minimum 1).
    pub fn bounded(capacity: usize) -> (Self, QueueReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, QueueReceiver { receiver })
    }

    /// Waits for space, then enqueues.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` once the dispatch side has shut down.
    pub async fn enqueue(&self, notification: Notification) -> Result<(), DomainError> {
        self.sender.send(notification).await.map_err(|e| {
            DomainError::new(ErrorCode::QueueClosed, "Notification queue closed")
                .with_detail("message_id", e.0.message_id.to_string())
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Maximum number of queued notifications.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[async_trait]
impl NotificationPublisher for NotificationQueue {
    async fn publish(&self, notification: Notification) -> Result<(), DomainError> {
        self.enqueue(notification).await
    }
}

impl QueueReceiver {
    /// Next notification in arrival order, or `None` once closed and empty.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Rejects further enqueues; queued notifications stay receivable.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eventsub::{
        EventKind, StreamOfflineEvent, Subscription, TransportOpts, TypedEvent,
    };
    use crate::domain::foundation::MessageId;
    use std::time::Duration;

    fn notification(id: &str) -> Notification {
        Notification {
            message_id: MessageId::new(id).unwrap(),
            subscription: Subscription::request(
                EventKind::StreamOffline,
                Default::default(),
                TransportOpts::webhook("https://example.com", "hook", ""),
            ),
            event: TypedEvent::StreamOffline(StreamOfflineEvent {
                broadcaster_user_id: "1".into(),
                broadcaster_user_login: "a".into(),
                broadcaster_user_name: "A".into(),
            }),
        }
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (queue, _rx) = NotificationQueue::bounded(0);
        assert_eq!(queue.capacity(), 1);
    }

    #[tokio::test]
    async fn preserves_arrival_order() {
        let (queue, mut rx) = NotificationQueue::bounded(4);
        for id in ["a", "b", "c"] {
            queue.enqueue(notification(id)).await.unwrap();
        }

        for expected in ["a", "b", "c"] {
            assert_eq!(rx.recv().await.unwrap().message_id.as_str(), expected);
        }
    }

    #[tokio::test]
    async fn enqueue_waits_while_full() {
        let (queue, mut rx) = NotificationQueue::bounded(1);
        queue.enqueue(notification("a")).await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), queue.enqueue(notification("b"))).await;
        assert!(blocked.is_err(), "second enqueue should wait for the consumer");

        rx.recv().await.unwrap();
        queue.enqueue(notification("b")).await.unwrap();
    }

    #[tokio::test]
    async fn close_rejects_new_items_but_drains_queued_ones() {
        let (queue, mut rx) = NotificationQueue::bounded(2);
        queue.enqueue(notification("a")).await.unwrap();

        rx.close();

        let err = queue.enqueue(notification("b")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::QueueClosed);
        assert_eq!(err.details.get("message_id"), Some(&"b".to_string()));
        assert_eq!(rx.recv().await.unwrap().message_id.as_str(), "a");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn publish_goes_through_the_queue() {
        let (queue, mut rx) = NotificationQueue::bounded(1);
        let publisher: &dyn NotificationPublisher = &queue;

        publisher.publish(notification("a")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().message_id.as_str(), "a");
    }

    #[tokio::test]
    async fn close_wakes_blocked_enqueue() {
        let (queue, mut rx) = NotificationQueue::bounded(1);
        queue.enqueue(notification("a")).await.unwrap();

        let waiting = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(notification("b")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        rx.close();

        assert!(waiting.await.unwrap().is_err());
        assert!(queue.is_closed());
    }
}
