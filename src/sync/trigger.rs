//! Background sync trigger.
//!
//! DESIGN
//! ======
//! The trigger is a standalone task with no store handle. It listens for
//! connectivity restoration and for deferred-sync registrations, and answers
//! both by broadcasting `SyncMessage::DrainRequested` to every subscribed
//! foreground page. Registrations made while offline are coalesced by tag and
//! fire on the next restoration; a registration made while online fires at
//! once.
//!
//! TRADE-OFFS
//! ==========
//! Firing twice is harmless: the drain coordinator tolerates duplicate
//! requests, so the trigger never tries to deduplicate across restorations.

use std::collections::BTreeSet;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::message::SyncMessage;
use crate::connectivity::RestorationWatch;

const EVENT_QUEUE_CAPACITY: usize = 32;
const CLIENT_QUEUE_CAPACITY: usize = 16;

/// Inputs accepted by the trigger task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Ask for a drain the next time the device is online.
    Register(String),
    /// The host reports connectivity is back.
    ConnectivityRestored,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("background sync trigger is not running")]
pub struct TriggerUnavailable;

/// Handle used to register deferred syncs with the trigger.
#[derive(Clone)]
pub struct SyncRegistration {
    tx: mpsc::Sender<TriggerEvent>,
}

impl SyncRegistration {
    /// Register interest in a drain under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerUnavailable`] if the trigger task has stopped or its
    /// queue is full; callers fall back to their own connectivity listener.
    pub fn register(&self, tag: &str) -> Result<(), TriggerUnavailable> {
        self.tx
            .try_send(TriggerEvent::Register(tag.to_owned()))
            .map_err(|_| TriggerUnavailable)
    }
}

/// Owner handle for a running trigger task.
pub struct TriggerHandle {
    events: mpsc::Sender<TriggerEvent>,
    clients: broadcast::Sender<SyncMessage>,
    task: JoinHandle<()>,
}

impl TriggerHandle {
    #[must_use]
    pub fn registration(&self) -> SyncRegistration {
        SyncRegistration { tx: self.events.clone() }
    }

    /// Attach a foreground page; it receives every future drain request.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.clients.subscribe()
    }

    /// Forward a host connectivity-restored event.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerUnavailable`] if the trigger task has stopped.
    pub fn connectivity_restored(&self) -> Result<(), TriggerUnavailable> {
        self.events
            .try_send(TriggerEvent::ConnectivityRestored)
            .map_err(|_| TriggerUnavailable)
    }

    /// Stop the trigger. Subscribed pages observe a closed channel.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Spawn the trigger task, observing `connectivity` for restorations.
#[must_use]
pub fn spawn_sync_trigger(connectivity: watch::Receiver<bool>) -> TriggerHandle {
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (clients, _) = broadcast::channel(CLIENT_QUEUE_CAPACITY);
    let task = tokio::spawn(run_trigger(RestorationWatch::new(connectivity), events_rx, clients.clone()));
    info!("background sync trigger started");
    TriggerHandle { events: events_tx, clients, task }
}

async fn run_trigger(
    mut connectivity: RestorationWatch,
    mut events: mpsc::Receiver<TriggerEvent>,
    clients: broadcast::Sender<SyncMessage>,
) {
    let mut registered: BTreeSet<String> = BTreeSet::new();
    let mut watching = true;

    loop {
        tokio::select! {
            restored = connectivity.restored(), if watching => {
                if restored {
                    on_connectivity_restored(&clients, &mut registered);
                } else {
                    // EDGE: signal source gone; keep serving explicit events.
                    warn!("connectivity signal closed; trigger now relies on explicit events");
                    watching = false;
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    TriggerEvent::Register(tag) => {
                        if connectivity.is_online() {
                            debug!(%tag, "sync registered while online; firing now");
                            broadcast_drain(&clients);
                        } else {
                            debug!(%tag, "sync registered while offline; deferring");
                            registered.insert(tag);
                        }
                    }
                    TriggerEvent::ConnectivityRestored => on_connectivity_restored(&clients, &mut registered),
                }
            }
        }
    }

    info!("background sync trigger stopped");
}

fn on_connectivity_restored(clients: &broadcast::Sender<SyncMessage>, registered: &mut BTreeSet<String>) {
    info!(deferred = registered.len(), "connectivity restored; requesting drain");
    registered.clear();
    broadcast_drain(clients);
}

fn broadcast_drain(clients: &broadcast::Sender<SyncMessage>) {
    match clients.send(SyncMessage::DrainRequested) {
        Ok(receivers) => debug!(receivers, "drain request broadcast"),
        Err(_) => debug!("no foreground pages attached; drain request dropped"),
    }
}

#[cfg(test)]
#[path = "trigger_test.rs"]
mod tests;
