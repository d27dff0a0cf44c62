//! Submission policy: send a new story now, or queue it for later.
//!
//! DESIGN
//! ======
//! Offline submissions go straight to the pending queue. Online submissions
//! are sent; only a transport failure (no server answer) falls back to the
//! queue. A server rejection is reported to the user and never queued, since
//! resending the same payload would be rejected again.
//!
//! ERROR HANDLING
//! ==============
//! The offline path depends on the store, so a store failure fails the whole
//! submission with [`SubmitError::StorageUnavailable`] even when the network
//! is fine. Remote failures never escape: they become an outcome.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, StoryApi};
use crate::error::{ErrorCode, FailureKind};
use crate::models::StoryPayload;
use crate::notice::{self, Notice, NoticeSender};
use crate::store::{LocalStore, StoreError};
use crate::sync::{SYNC_TAG, SyncRegistration};

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the story.
    Submitted { message: String },
    /// The story was saved locally and will be sent by a later drain.
    Queued { id: i64 },
    /// The server answered and refused the story.
    Rejected { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    StorageUnavailable(#[from] StoreError),
}

impl SubmitError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        FailureKind::StorageUnavailable
    }
}

impl ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(e) => e.error_code(),
        }
    }
}

pub struct SubmissionPolicy {
    store: LocalStore,
    api: Arc<dyn StoryApi>,
    registration: Option<SyncRegistration>,
    notices: Option<NoticeSender>,
}

impl SubmissionPolicy {
    #[must_use]
    pub fn new(store: LocalStore, api: Arc<dyn StoryApi>) -> Self {
        Self { store, api, registration: None, notices: None }
    }

    /// Register deferred syncs with a running background trigger.
    #[must_use]
    pub fn with_registration(mut self, registration: SyncRegistration) -> Self {
        self.registration = Some(registration);
        self
    }

    #[must_use]
    pub fn with_notices(mut self, notices: NoticeSender) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Submit a validated story, choosing the direct or queued path.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::StorageUnavailable`] if the story had to be
    /// queued and the store could not be written.
    pub async fn submit(&self, payload: &StoryPayload, is_online: bool) -> Result<SubmitOutcome, SubmitError> {
        if !is_online {
            info!("offline; queueing submission");
            return self.enqueue(payload).await;
        }

        match self.api.create_story(payload).await {
            Ok(message) => {
                info!("story submitted");
                notice::emit(self.notices.as_ref(), Notice::Submitted);
                Ok(SubmitOutcome::Submitted { message })
            }
            Err(ApiError::Rejected { status, message }) => {
                warn!(status, %message, "story rejected by server");
                notice::emit(self.notices.as_ref(), Notice::Rejected { message: message.clone() });
                Ok(SubmitOutcome::Rejected { message })
            }
            Err(e @ ApiError::Transport(_)) => {
                warn!(error = %e, "transport failure; queueing submission");
                self.enqueue(payload).await
            }
        }
    }

    async fn enqueue(&self, payload: &StoryPayload) -> Result<SubmitOutcome, SubmitError> {
        let record = match self.store.add_pending(&payload.to_new_pending()).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "could not queue submission");
                notice::emit(self.notices.as_ref(), Notice::StorageUnavailable { detail: e.to_string() });
                return Err(e.into());
            }
        };

        self.register_sync();
        notice::emit(self.notices.as_ref(), Notice::Queued { id: record.id });
        Ok(SubmitOutcome::Queued { id: record.id })
    }

    fn register_sync(&self) {
        let Some(registration) = &self.registration else {
            return;
        };
        // EDGE: the record is already durable; the foreground listener still drains it.
        if let Err(e) = registration.register(SYNC_TAG) {
            warn!(error = %e, tag = SYNC_TAG, "sync registration failed");
        }
    }
}

#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;
