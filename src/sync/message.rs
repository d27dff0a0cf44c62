//! Cross-context message from the sync trigger to foreground pages.

use serde::{Deserialize, Serialize};

/// Tag used when registering interest in a deferred sync.
pub const SYNC_TAG: &str = "sync-stories";

/// Messages the trigger sends to controlled foreground pages.
/// Pages do not acknowledge; they report through their own UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    #[serde(rename = "SYNC_PENDING_STORIES")]
    DrainRequested,
}
