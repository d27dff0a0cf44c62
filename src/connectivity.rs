//! Connectivity signal shared by the submission policy and the sync trigger.
//!
//! DESIGN
//! ======
//! The host's online/offline state is a `watch` channel: writers publish the
//! latest state, readers see only the newest value. `RestorationWatch` turns
//! that stream into discrete "connectivity restored" edges (offline -> online).
//! An optional probe task derives the state from periodic reachability checks
//! when the host provides no events of its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Publisher side of the online/offline signal.
#[derive(Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a new state. Returns `true` if the state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "connectivity changed");
        }
        changed
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Yields once per offline -> online transition.
pub struct RestorationWatch {
    rx: watch::Receiver<bool>,
    was_online: bool,
}

impl RestorationWatch {
    #[must_use]
    pub fn new(mut rx: watch::Receiver<bool>) -> Self {
        let was_online = *rx.borrow_and_update();
        Self { rx, was_online }
    }

    /// Wait for the next restoration. Returns `false` once the signal source
    /// is gone and no further transitions can arrive.
    pub async fn restored(&mut self) -> bool {
        loop {
            if self.rx.changed().await.is_err() {
                return false;
            }
            let online = *self.rx.borrow_and_update();
            let restored = online && !self.was_online;
            self.was_online = online;
            if restored {
                return true;
            }
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Something that can tell whether the remote service answers at all.
#[async_trait::async_trait]
pub trait Reachability: Send + Sync {
    async fn reachable(&self) -> bool;
}

/// Spawn a task that polls `probe` and publishes the result.
pub fn spawn_connectivity_probe(
    probe: Arc<dyn Reachability>,
    connectivity: Connectivity,
    interval: Duration,
) -> JoinHandle<()> {
    info!(interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX), "connectivity probe configured");
    let interval = interval.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let online = probe.reachable().await;
            connectivity.set_online(online);
        }
    })
}

#[cfg(test)]
#[path = "connectivity_test.rs"]
mod tests;
