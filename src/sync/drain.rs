//! Drain coordinator: redeliver queued submissions once the network is back.
//!
//! DESIGN
//! ======
//! A drain snapshots the queue, then walks it oldest first. Each record is
//! rebuilt into its original payload and sent; only a confirmed remote
//! success deletes it. Any per-record failure is counted and skipped so one
//! bad record never blocks the rest. Records queued after the snapshot wait
//! for the next drain.
//!
//! CONCURRENCY
//! ===========
//! Drains within one process are serialized by an async mutex: a second
//! request waits, then re-reads the queue, so it never resends a record the
//! first drain already delivered. Drains from separate processes sharing one
//! database are not coordinated; two of them can both send a record before
//! either deletes it, producing a duplicate story on the server. That risk
//! is accepted and logged at drain start.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::StoryApi;
use crate::models::PendingSubmission;
use crate::notice::{self, Notice, NoticeSender};
use crate::store::{LocalStore, StoreError};

/// Exact outcome counts of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub success: usize,
    pub fail: usize,
}

impl DrainSummary {
    /// Listings should reload when at least one story went through.
    #[must_use]
    pub fn should_refresh(&self) -> bool {
        self.success > 0
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.success + self.fail
    }
}

#[derive(Clone)]
pub struct DrainCoordinator {
    store: LocalStore,
    api: Arc<dyn StoryApi>,
    notices: Option<NoticeSender>,
    running: Arc<Mutex<()>>,
}

impl DrainCoordinator {
    #[must_use]
    pub fn new(store: LocalStore, api: Arc<dyn StoryApi>) -> Self {
        Self { store, api, notices: None, running: Arc::new(Mutex::new(())) }
    }

    #[must_use]
    pub fn with_notices(mut self, notices: NoticeSender) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Attempt delivery of every queued submission.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the queue cannot be read, or if
    /// a delivered record cannot be removed (continuing would resend it).
    pub async fn drain(&self) -> Result<DrainSummary, StoreError> {
        let _running = self.running.lock().await;

        let pending = match self.store.list_pending().await {
            Ok(pending) => pending,
            Err(e) => return Err(self.storage_failure(e)),
        };
        if pending.is_empty() {
            return Ok(DrainSummary::default());
        }

        info!(count = pending.len(), "draining pending submissions; concurrent processes are not coordinated");

        let mut summary = DrainSummary::default();
        for record in &pending {
            match self.deliver(record).await {
                Ok(true) => summary.success += 1,
                Ok(false) => summary.fail += 1,
                Err(e) => {
                    warn!(success = summary.success, fail = summary.fail, "drain aborted by storage failure");
                    return Err(self.storage_failure(e));
                }
            }
        }

        info!(success = summary.success, fail = summary.fail, "drain finished");
        notice::emit(self.notices.as_ref(), Notice::DrainCompleted(summary));
        if summary.should_refresh() {
            notice::emit(self.notices.as_ref(), Notice::RefreshListing);
        }
        Ok(summary)
    }

    /// Send one record. `Ok(true)` means delivered and removed; `Ok(false)`
    /// means it stays queued.
    async fn deliver(&self, record: &PendingSubmission) -> Result<bool, StoreError> {
        let payload = match record.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(id = record.id, error = %e, "pending submission unreadable; leaving queued");
                return Ok(false);
            }
        };

        match self.api.create_story(&payload).await {
            Ok(_) => {
                self.store.delete_pending(record.id).await?;
                info!(id = record.id, "pending submission delivered");
                Ok(true)
            }
            Err(e) => {
                warn!(id = record.id, kind = %e.kind(), error = %e, "pending submission not delivered");
                Ok(false)
            }
        }
    }

    fn storage_failure(&self, e: StoreError) -> StoreError {
        notice::emit(self.notices.as_ref(), Notice::StorageUnavailable { detail: e.to_string() });
        e
    }
}

#[cfg(test)]
#[path = "drain_test.rs"]
mod tests;
