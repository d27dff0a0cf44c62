//! Foreground sync loop.
//!
//! DESIGN
//! ======
//! The foreground page owns the drain coordinator. It drains whenever the
//! background trigger broadcasts `SyncMessage::DrainRequested`. With no
//! trigger, or once the trigger's channel closes, it listens to the
//! connectivity signal itself and drains on every restoration, so queued
//! stories still go out without a background context.
//!
//! ERROR HANDLING
//! ==============
//! A failed drain is logged and the loop keeps running; the coordinator has
//! already emitted the user notice.

use std::future::Future;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::drain::DrainCoordinator;
use super::message::SyncMessage;
use crate::connectivity::RestorationWatch;

/// Run until `shutdown` resolves, draining on every request.
pub async fn run_foreground<F>(
    coordinator: DrainCoordinator,
    mut trigger: Option<broadcast::Receiver<SyncMessage>>,
    connectivity: watch::Receiver<bool>,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut fallback = if trigger.is_none() {
        info!("no background trigger; draining on connectivity restoration");
        Some(RestorationWatch::new(connectivity.clone()))
    } else {
        None
    };

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            message = next_request(&mut trigger) => match message {
                Ok(SyncMessage::DrainRequested) => run_drain(&coordinator).await,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "drain requests coalesced");
                    run_drain(&coordinator).await;
                }
                Err(RecvError::Closed) => {
                    warn!("background trigger gone; falling back to connectivity listener");
                    trigger = None;
                    let watch = RestorationWatch::new(connectivity.clone());
                    // EDGE: a request may have been lost with the trigger.
                    let online = watch.is_online();
                    fallback = Some(watch);
                    if online {
                        run_drain(&coordinator).await;
                    }
                }
            },
            restored = next_restoration(&mut fallback) => {
                if restored {
                    run_drain(&coordinator).await;
                } else {
                    warn!("connectivity signal closed; automatic drains stopped");
                    fallback = None;
                }
            }
        }
    }

    info!("foreground sync loop stopped");
}

async fn next_request(trigger: &mut Option<broadcast::Receiver<SyncMessage>>) -> Result<SyncMessage, RecvError> {
    match trigger {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_restoration(fallback: &mut Option<RestorationWatch>) -> bool {
    match fallback {
        Some(watch) => watch.restored().await,
        None => std::future::pending().await,
    }
}

async fn run_drain(coordinator: &DrainCoordinator) {
    match coordinator.drain().await {
        Ok(summary) => debug!(success = summary.success, fail = summary.fail, "foreground drain done"),
        Err(e) => warn!(error = %e, "foreground drain failed"),
    }
}

#[cfg(test)]
#[path = "foreground_test.rs"]
mod tests;
