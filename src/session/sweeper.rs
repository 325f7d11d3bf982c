//! Background worker evicting idle sessions.
//!
//! The store never forgets a conversation on its own. When an idle TTL is
//! configured, this worker periodically removes sessions that have not seen a
//! turn for longer than that TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::store::SessionStore;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the idle sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Sessions idle longer than this are evicted.
    pub idle_ttl: Duration,
    /// Time between sweeps.
    pub interval: Duration,
}

impl SweeperConfig {
    /// Sweep every minute, or every `idle_ttl` if that is shorter.
    #[must_use]
    pub fn for_ttl(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl,
            interval: idle_ttl.min(DEFAULT_SWEEP_INTERVAL),
        }
    }
}

/// Periodic idle-session eviction.
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    config: SweeperConfig,
    shutdown: Arc<Notify>,
}

impl SessionSweeper {
    /// Create a sweeper over `store`.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, config: SweeperConfig) -> Self {
        Self {
            store,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle used to stop the worker.
    #[must_use]
    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Spawn the worker on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        info!(
            idle_ttl_secs = self.config.idle_ttl.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "Starting idle session sweeper"
        );

        loop {
            tokio::select! {
                () = tokio::time::sleep(self.config.interval) => {
                    self.sweep_once();
                }
                () = self.shutdown.notified() => {
                    info!("Idle session sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// Run a single sweep and return the number of evicted sessions.
    pub fn sweep_once(&self) -> usize {
        let evicted = self.store.evict_idle(self.config.idle_ttl);
        if evicted > 0 {
            info!(evicted, remaining = self.store.len(), "Evicted idle sessions");
        } else {
            debug!(remaining = self.store.len(), "No idle sessions to evict");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_capped_by_ttl() {
        let short = SweeperConfig::for_ttl(Duration::from_secs(5));
        assert_eq!(short.interval, Duration::from_secs(5));

        let long = SweeperConfig::for_ttl(Duration::from_secs(3600));
        assert_eq!(long.interval, DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn test_sweep_keeps_active_sessions() {
        let store = Arc::new(SessionStore::with_defaults());
        store.get_or_create(None);
        let sweeper = SessionSweeper::new(
            Arc::clone(&store),
            SweeperConfig::for_ttl(Duration::from_secs(3600)),
        );

        assert_eq!(sweeper.sweep_once(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown() {
        let store = Arc::new(SessionStore::with_defaults());
        let sweeper = SessionSweeper::new(store, SweeperConfig::for_ttl(Duration::from_secs(3600)));
        let shutdown = sweeper.shutdown_notifier();
        let handle = sweeper.spawn();

        shutdown.notify_one();
        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}
