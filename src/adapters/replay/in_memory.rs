//! In-memory replay guard with a periodic sweeper.
//!
//! Accepted message ids are kept in a map with their expiry instant. Lookups
//! take the read lock; only a first sighting takes the write lock. A
//! background task removes expired entries on a fixed cadence, independent
//! of `observe` traffic.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::domain::foundation::MessageId;
use crate::ports::{Observation, ReplayGuard};

/// Default replay window (24 hours).
pub const DEFAULT_REPLAY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default sweep cadence (1 hour).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Longest replay window accepted (30 days); longer values are clamped.
pub const MAX_REPLAY_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Longest sweep cadence accepted (1 day); longer values are clamped.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Process-local replay guard.
pub struct InMemoryReplayGuard {
    seen: RwLock<HashMap<MessageId, Instant>>,
    ttl: Duration,
}

impl InMemoryReplayGuard {
    /// Creates an empty guard that remembers ids for `ttl`, at most
    /// [`MAX_REPLAY_TTL`].
    pub fn new(ttl: Duration) -> Self {
        if ttl > MAX_REPLAY_TTL {
            tracing::warn!(
                requested_secs = ttl.as_secs(),
                max_secs = MAX_REPLAY_TTL.as_secs(),
                "Replay window clamped"
            );
        }
        Self {
            seen: RwLock::new(HashMap::new()),
            ttl: ttl.min(MAX_REPLAY_TTL),
        }
    }

    /// Effective replay window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts the background sweeper.
    ///
    /// The sweeper holds a strong reference; stop it with
    /// [`ReplaySweeper::stop`] to release the guard. `every` is clamped to
    /// [`MAX_SWEEP_INTERVAL`].
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> ReplaySweeper {
        let every = every.min(MAX_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let guard = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut interval = time::interval(every);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            return;
                        }
                    }
                    _ = interval.tick() => {
                        let removed = guard.sweep().await;
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired replay entries");
                        }
                    }
                }
            }
        });

        ReplaySweeper { shutdown_tx, task }
    }

    /// Removes expired entries now. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut seen = self.seen.write().await;
        let before = seen.len();
        seen.retain(|_, expires_at| *expires_at > now);
        before - seen.len()
    }

    /// Number of ids currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.seen.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.seen.read().await.is_empty()
    }
}

impl Default for InMemoryReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_TTL)
    }
}

#[async_trait]
impl ReplayGuard for InMemoryReplayGuard {
    async fn observe(&self, message_id: &MessageId) -> Observation {
        let now = Instant::now();

        {
            let seen = self.seen.read().await;
            if matches!(seen.get(message_id), Some(expires_at) if *expires_at > now) {
                return Observation::Duplicate;
            }
        }

        // Re-check under the write lock; another request may have won.
        let mut seen = self.seen.write().await;
        match seen.get(message_id) {
            Some(expires_at) if *expires_at > now => Observation::Duplicate,
            _ => {
                match now.checked_add(self.ttl) {
                    Some(expires_at) => {
                        seen.insert(message_id.clone(), expires_at);
                    }
                    None => tracing::warn!(
                        message_id = %message_id,
                        "Replay expiry out of range; id not recorded"
                    ),
                }
                Observation::Fresh
            }
        }
    }

    async fn release(&self, message_id: &MessageId) {
        self.seen.write().await.remove(message_id);
    }
}

/// Handle to a running sweeper task.
pub struct ReplaySweeper {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReplaySweeper {
    /// Signals the sweeper to stop and waits for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Replay sweeper task ended abnormally");
        }
    }
}
