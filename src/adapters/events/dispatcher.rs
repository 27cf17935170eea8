//! Dispatcher - background loop that fans notifications out to handlers.
//!
//! The loop takes notifications from the queue one at a time, in order.
//! For each one it launches every matching handler as its own task and
//! moves on without waiting for them, so a slow handler never delays the
//! next notification or another handler.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `max_concurrent_handlers` | unbounded | Handler tasks allowed to run at once |
//!
//! ## Graceful Shutdown
//!
//! On the shutdown signal the queue is closed, everything already queued
//! is dispatched, and the loop exits. Handler tasks still running are left
//! to finish on their own.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

use super::handler_registry::HandlerRegistry;
use super::notification_queue::QueueReceiver;
use crate::domain::eventsub::Notification;
use crate::ports::EventHandler;

/// Configuration for the Dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Upper bound on concurrently running handler tasks; `None` is unbounded.
    pub max_concurrent_handlers: Option<usize>,
}

impl DispatcherConfig {
    /// Create config with a bound on concurrent handler tasks.
    pub fn with_max_concurrent_handlers(mut self, limit: usize) -> Self {
        self.max_concurrent_handlers = Some(limit.max(1));
        self
    }
}

/// Fans decoded notifications out to registered handlers.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    limiter: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// Create a Dispatcher with default (unbounded) configuration.
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    /// Create a Dispatcher with custom configuration.
    pub fn with_config(registry: Arc<HandlerRegistry>, config: DispatcherConfig) -> Self {
        Self {
            registry,
            limiter: config
                .max_concurrent_handlers
                .map(|limit| Arc::new(Semaphore::new(limit.max(1)))),
        }
    }

    /// Run the dispatch loop until the queue closes or shutdown is signalled.
    ///
    /// Returns the number of notifications dispatched.
    pub async fn run(&self, mut queue: QueueReceiver, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut dispatched = 0;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        queue.close();
                        while let Some(notification) = queue.recv().await {
                            self.dispatch(notification);
                            dispatched += 1;
                        }
                        tracing::info!(dispatched, "Dispatch loop drained and stopped");
                        return dispatched;
                    }
                }

                next = queue.recv() => {
                    match next {
                        Some(notification) => {
                            self.dispatch(notification);
                            dispatched += 1;
                        }
                        None => {
                            tracing::info!(dispatched, "Notification queue closed; dispatch loop stopping");
                            return dispatched;
                        }
                    }
                }
            }
        }
    }

    /// Launch every handler registered for the notification's kind.
    ///
    /// Returns the spawned tasks; dropping them detaches the handlers.
    /// A kind with no handlers is a no-op.
    pub fn dispatch(&self, notification: Notification) -> Vec<JoinHandle<()>> {
        let handlers = self.registry.handlers_for(notification.kind());
        if handlers.is_empty() {
            tracing::debug!(
                message_id = %notification.message_id,
                event_type = %notification.kind(),
                "No handlers registered"
            );
            return Vec::new();
        }

        tracing::debug!(
            message_id = %notification.message_id,
            event_type = %notification.kind(),
            handlers = handlers.len(),
            "Dispatching notification"
        );

        let notification = Arc::new(notification);
        handlers
            .into_iter()
            .map(|handler| {
                tokio::spawn(run_handler(
                    handler,
                    Arc::clone(&notification),
                    self.limiter.clone(),
                ))
            })
            .collect()
    }
}

async fn run_handler(
    handler: Arc<dyn EventHandler>,
    notification: Arc<Notification>,
    limiter: Option<Arc<Semaphore>>,
) {
    let _permit = match limiter {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::warn!(handler = handler.name(), "Handler limiter closed; skipping");
                return;
            }
        },
        None => None,
    };

    let outcome = AssertUnwindSafe(handler.handle(Arc::clone(&notification)))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(
            handler = handler.name(),
            message_id = %notification.message_id,
            event_type = %notification.kind(),
            error = %e,
            "Handler failed"
        ),
        Err(_) => tracing::error!(
            handler = handler.name(),
            message_id = %notification.message_id,
            event_type = %notification.kind(),
            "Handler panicked"
        ),
    }
}
