//! Handler registry - append-only table of handlers per event kind.
//!
//! Lookups clone the handler list and release the lock before any handler
//! runs, so registration never waits on a slow handler.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::eventsub::{CatalogEvent, EventKind, Notification, Subscription, TypedEvent};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EventHandler, EventSubscriber};

/// Registry of notification handlers keyed by event kind.
///
/// # Example
///
/// ```ignore
/// let registry = HandlerRegistry::new();
///
/// registry.on(EventKind::StreamOffline, |_sub, _event| async { Ok::<(), DomainError>(()) });
/// registry.on_event(|sub: Subscription, online: StreamOnlineEvent| async move {
///     tracing::info!(login = %online.broadcaster_user_login, "Went live");
///     Ok(())
/// });
///
/// assert_eq!(registry.handler_count(EventKind::StreamOnline), 1);
/// ```
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the handlers registered for `kind`, in registration order.
    pub fn handlers_for(&self, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Registers a closure receiving the subscription and the decoded event.
    pub fn on<F, Fut>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Subscription, TypedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
    {
        self.subscribe(kind, Arc::new(FnHandler { callback }));
    }

    /// Registers a closure typed on one payload struct.
    ///
    /// The closure is subscribed to every kind that carries `E`; payloads
    /// shared by several kinds (such as custom reward add/update/remove)
    /// therefore reach the same closure for each of them.
    pub fn on_event<E, F, Fut>(&self, callback: F)
    where
        E: CatalogEvent + Clone,
        F: Fn(Subscription, E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
    {
        let handler: Arc<dyn EventHandler> = Arc::new(TypedFnHandler {
            callback,
            _event: PhantomData::<fn(E)>,
        });
        self.subscribe_all(E::KINDS, handler);
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for HandlerRegistry {
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        tracing::debug!(event_type = %kind, handler = handler.name(), "Registering handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(handler);
    }
}

struct FnHandler<F> {
    callback: F,
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Subscription, TypedEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    async fn handle(&self, notification: Arc<Notification>) -> Result<(), DomainError> {
        (self.callback)(notification.subscription.clone(), notification.event.clone()).await
    }

    fn name(&self) -> &'static str {
        "callback"
    }
}

struct TypedFnHandler<E, F> {
    callback: F,
    _event: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, F, Fut> EventHandler for TypedFnHandler<E, F>
where
    E: CatalogEvent + Clone,
    F: Fn(Subscription, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    async fn handle(&self, notification: Arc<Notification>) -> Result<(), DomainError> {
        let event = E::from_typed(&notification.event).cloned().ok_or_else(|| {
            DomainError::new(
                ErrorCode::EventTypeMismatch,
                format!("handler does not accept {}", notification.kind()),
            )
        })?;
        (self.callback)(notification.subscription.clone(), event).await
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<E>()
    }
}
