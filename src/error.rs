//! Failure taxonomy shared by the store, the remote client, and the sync core.
//!
//! DESIGN
//! ======
//! Every failure that crosses a component boundary is tagged with exactly one
//! [`FailureKind`]. The submission policy and the drain coordinator branch on
//! the kind, never on message text.

/// The three failure classes the offline core knows how to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Local store inaccessible (quota, disabled, corrupt).
    StorageUnavailable,
    /// No server response was obtained (unreachable, aborted, timed out).
    TransportFailure,
    /// The server answered and reported a logical error.
    ApplicationRejected,
}

impl FailureKind {
    /// Stable lowercase label used in log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::TransportFailure => "transport_failure",
            Self::ApplicationRejected => "application_rejected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error code plus retry hint.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
