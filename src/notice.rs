//! User-facing notices emitted by the submission policy and drain coordinator.
//!
//! The rendering surface is external; this module only fixes what each
//! outcome says, so storage trouble never reads like a network problem.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::sync::drain::DrainSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A story reached the server directly.
    Submitted,
    /// A story was saved locally and will be sent automatically.
    Queued { id: i64 },
    /// The server refused a story.
    Rejected { message: String },
    /// The local store could not be used.
    StorageUnavailable { detail: String },
    /// A drain finished with exact counts.
    DrainCompleted(DrainSummary),
    /// Any displayed story listing is stale and should reload.
    RefreshListing,
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Submitted => "Story posted.".to_owned(),
            Self::Queued { .. } => "You're offline. The story was saved and will be sent automatically.".to_owned(),
            Self::Rejected { message } => format!("The server rejected the story: {message}"),
            Self::StorageUnavailable { detail } => format!("Local storage is unavailable: {detail}"),
            Self::DrainCompleted(summary) => {
                format!("Sync finished: {} sent, {} failed.", summary.success, summary.fail)
            }
            Self::RefreshListing => "Stories updated.".to_owned(),
        }
    }
}

pub type NoticeSender = mpsc::Sender<Notice>;

/// Best-effort, non-blocking notice delivery.
pub(crate) fn emit(tx: Option<&NoticeSender>, notice: Notice) {
    let Some(tx) = tx else {
        return;
    };

    match tx.try_send(notice) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(notice)) => {
            warn!(?notice, "notice queue full; dropping notice");
        }
        Err(mpsc::error::TrySendError::Closed(notice)) => {
            warn!(?notice, "notice queue closed; dropping notice");
        }
    }
}

/// Hand every notice to `deliver` until all senders are gone.
///
/// Awaiting the handle after dropping the senders flushes whatever is still
/// queued, so a shutdown never swallows a final drain summary.
pub fn spawn_notice_sink<F>(mut rx: mpsc::Receiver<Notice>, mut deliver: F) -> JoinHandle<()>
where
    F: FnMut(Notice) + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            deliver(notice);
        }
    })
}

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;
