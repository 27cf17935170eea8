//! WebhookEngine - owns the webhook pipeline and its background tasks.
//!
//! Starting the engine spawns two tasks: the dispatch loop and the replay
//! cache sweeper. `shutdown` stops both, dispatching whatever was already
//! queued first.
//!
//! ```ignore
//! let engine = WebhookEngine::start(&config.webhook)?.with_api(Arc::new(helix));
//!
//! engine.registry().on_event(|_sub, online: StreamOnlineEvent| async move {
//!     tracing::info!(login = %online.broadcaster_user_login, "Went live");
//!     Ok(())
//! });
//! engine.create_subscription(EventKind::StreamOnline, Condition::broadcaster("1337")).await?;
//!
//! axum::serve(listener, engine.router()).await?;
//! engine.shutdown().await;
//! ```

use std::sync::Arc;

use axum::Router;
use futures::TryStreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::pagination::{paginate, Paginated};
use crate::adapters::events::{Dispatcher, DispatcherConfig, HandlerRegistry, NotificationQueue};
use crate::adapters::http::webhook::{webhook_routes, WebhookAppState};
use crate::adapters::replay::{InMemoryReplayGuard, ReplaySweeper};
use crate::config::{ValidationError, WebhookConfig};
use crate::domain::eventsub::{
    Condition, EventKind, NotificationDecoder, SignatureVerifier, Subscription, TransportOpts,
};
use crate::domain::helix::{broadcaster_login, Stream, StreamFilter, SubscriptionFilter, User};
use crate::ports::{ApiError, EventHandler, EventSubApi, EventSubscriber, PaginationCursor};

/// Orchestrates verification, decoding, queueing, and dispatch.
pub struct WebhookEngine {
    registry: Arc<HandlerRegistry>,
    state: WebhookAppState,
    path: String,
    secret: SecretString,
    callback_host: Option<String>,
    api: Option<Arc<dyn EventSubApi>>,
    shutdown_tx: watch::Sender<bool>,
    dispatch_task: JoinHandle<usize>,
    sweeper: ReplaySweeper,
}

impl WebhookEngine {
    /// Builds the pipeline and spawns its background tasks.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when a configured duration is zero or out
    /// of range; nothing is spawned in that case.
    pub fn start(config: &WebhookConfig) -> Result<Self, ValidationError> {
        let window = config.signature_window()?;
        let secret = config.resolve_secret();
        let verifier = SignatureVerifier::new(secret.clone())
            .with_max_age(window)
            .with_permissive(config.permissive);
        if verifier.is_permissive() {
            tracing::warn!("Webhook signature checks are disabled (permissive mode)");
        }

        let replay_guard = Arc::new(InMemoryReplayGuard::new(config.replay_ttl()));
        let sweeper = replay_guard.spawn_sweeper(config.replay_sweep_interval());

        let registry = Arc::new(HandlerRegistry::new());
        let (queue, receiver) = NotificationQueue::bounded(config.queue_capacity);
        let mut dispatcher_config = DispatcherConfig::default();
        if let Some(limit) = config.max_concurrent_handlers {
            dispatcher_config = dispatcher_config.with_max_concurrent_handlers(limit);
        }
        let dispatcher = Dispatcher::with_config(Arc::clone(&registry), dispatcher_config);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let dispatch_task =
            tokio::spawn(async move { dispatcher.run(receiver, shutdown_rx).await });

        tracing::info!(
            path = %config.path,
            queue_capacity = config.queue_capacity,
            max_concurrent_handlers = ?config.max_concurrent_handlers,
            "Webhook engine started"
        );

        Ok(Self {
            registry,
            state: WebhookAppState {
                verifier: Arc::new(verifier),
                replay_guard,
                decoder: Arc::new(NotificationDecoder::new()),
                publisher: Arc::new(queue),
            },
            path: config.path.clone(),
            secret,
            callback_host: config.callback_host.clone(),
            api: None,
            shutdown_tx,
            dispatch_task,
            sweeper,
        })
    }

    /// Attaches the REST collaborator used for subscription management.
    pub fn with_api(mut self, api: Arc<dyn EventSubApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Handler registry; closures can be registered with `on`/`on_event`.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Registers a handler for one event kind.
    pub fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.registry.subscribe(kind, handler);
    }

    /// Router serving the webhook path.
    pub fn router(&self) -> Router {
        webhook_routes(&self.path).with_state(self.state.clone())
    }

    /// Shared secret deliveries are signed with.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Transport options pointing the sender at this engine.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when no callback host is configured.
    pub fn transport(&self) -> Result<TransportOpts, ApiError> {
        let host = self.callback_host.as_deref().ok_or_else(|| {
            ApiError::InvalidRequest("no callback host configured".to_string())
        })?;
        Ok(TransportOpts::webhook(
            host,
            &self.path,
            self.secret.expose_secret().clone(),
        ))
    }

    fn api(&self) -> Result<&Arc<dyn EventSubApi>, ApiError> {
        self.api
            .as_ref()
            .ok_or_else(|| ApiError::InvalidRequest("no API client configured".to_string()))
    }

    /// Subscribes this engine to `kind`. `Ok(None)` means it already was.
    pub async fn create_subscription(
        &self,
        kind: EventKind,
        condition: Condition,
    ) -> Result<Option<Subscription>, ApiError> {
        let request = Subscription::request(kind, condition, self.transport()?);
        self.api()?.create_subscription(&request).await
    }

    /// Lazily lists this application's subscriptions.
    pub fn subscriptions(&self, filter: SubscriptionFilter) -> Result<Paginated<Subscription>, ApiError> {
        let api = Arc::clone(self.api()?);
        Ok(paginate(move |cursor: PaginationCursor| {
            let api = Arc::clone(&api);
            let filter = filter.clone();
            async move { api.subscriptions_page(&filter, &cursor).await }
        }))
    }

    /// Deletes every subscription, stopping at the first error.
    ///
    /// Returns how many were deleted.
    pub async fn clear_subscriptions(&self) -> Result<usize, ApiError> {
        let subscriptions: Vec<Subscription> = self
            .subscriptions(SubscriptionFilter::default())?
            .try_collect()
            .await?;

        let api = self.api()?;
        for subscription in &subscriptions {
            api.delete_subscription(&subscription.id).await?;
        }

        tracing::info!(deleted = subscriptions.len(), "Cleared subscriptions");
        Ok(subscriptions.len())
    }

    /// Lazily lists live streams matching `filter`.
    pub fn streams(&self, filter: StreamFilter) -> Result<Paginated<Stream>, ApiError> {
        let api = Arc::clone(self.api()?);
        Ok(paginate(move |cursor: PaginationCursor| {
            let api = Arc::clone(&api);
            let filter = filter.clone();
            async move { api.streams_page(&filter, &cursor).await }
        }))
    }

    /// Gathers every live stream matching `filter`, or the first error.
    pub async fn collect_streams(&self, filter: StreamFilter) -> Result<Vec<Stream>, ApiError> {
        self.streams(filter)?.try_collect().await
    }

    /// Looks up users by id and login; at most 100 combined.
    pub async fn get_users(&self, ids: &[String], logins: &[String]) -> Result<Vec<User>, ApiError> {
        self.api()?.users(ids, logins).await
    }

    /// Looks up a broadcaster by channel URL or login.
    pub async fn get_broadcaster(&self, url_or_login: &str) -> Result<Option<User>, ApiError> {
        let login = broadcaster_login(url_or_login);
        if login.is_empty() {
            return Err(ApiError::InvalidRequest("empty broadcaster name".to_string()));
        }

        let users = self.get_users(&[], &[login.to_string()]).await?;
        Ok(users.into_iter().next())
    }

    /// Stops intake, dispatches what is queued, and stops background tasks.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);

        match self.dispatch_task.await {
            Ok(dispatched) => tracing::info!(dispatched, "Dispatch loop stopped"),
            Err(e) => tracing::error!(error = %e, "Dispatch loop ended abnormally"),
        }

        self.sweeper.stop().await;
        tracing::info!("Webhook engine stopped");
    }
}
