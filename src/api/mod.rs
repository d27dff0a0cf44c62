//! Remote story service: contract and HTTP implementation.
//!
//! DESIGN
//! ======
//! `StoryApi` is the seam the submission policy and drain coordinator call
//! through; `StoryClient` is the reqwest implementation. Every failure is
//! tagged as either a transport failure (no server answer) or an
//! application rejection (the server answered with an error payload).

pub mod client;

use crate::error::{ErrorCode, FailureKind};
use crate::models::{Story, StoryPayload};

pub use client::StoryClient;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable server response was obtained.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered and reported a logical error.
    #[error("rejected by server (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::TransportFailure,
            Self::Rejected { .. } => FailureKind::ApplicationRejected,
        }
    }

    /// Human-readable reason without the classification prefix.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Transport(reason) => reason,
            Self::Rejected { message, .. } => message,
        }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Rejected { .. } => "E_REJECTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

// =============================================================================
// STORY API TRAIT
// =============================================================================

/// Remote story operations. Enables scripted doubles in tests.
#[async_trait::async_trait]
pub trait StoryApi: Send + Sync {
    /// Create a story from a multipart submission. Returns the server message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the server could not be reached and
    /// [`ApiError::Rejected`] if it answered with an error payload.
    async fn create_story(&self, payload: &StoryPayload) -> Result<String, ApiError>;

    /// List stories, optionally only those with a location.
    ///
    /// # Errors
    ///
    /// Same classification as [`StoryApi::create_story`].
    async fn list_stories(&self, with_location: bool) -> Result<Vec<Story>, ApiError>;

    /// Fetch a single story by id.
    ///
    /// # Errors
    ///
    /// Same classification as [`StoryApi::create_story`].
    async fn story_detail(&self, id: &str) -> Result<Story, ApiError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted answer to `create_story`.
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Ok,
        Transport,
        Rejected(&'static str),
    }

    /// `StoryApi` double that answers from a script and records what it saw.
    pub struct ScriptedApi {
        script: Mutex<VecDeque<Scripted>>,
        fallback: Scripted,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        pub fn new(script: Vec<Scripted>, fallback: Scripted) -> Self {
            Self { script: Mutex::new(script.into()), fallback, calls: Mutex::new(Vec::new()) }
        }

        pub fn always(answer: Scripted) -> Self {
            Self::new(Vec::new(), answer)
        }

        /// Descriptions of every submitted payload, in call order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StoryApi for ScriptedApi {
        async fn create_story(&self, payload: &StoryPayload) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push(payload.description().to_owned());
            let answer = self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());
            // Yield so overlapping callers actually interleave.
            tokio::task::yield_now().await;
            match answer {
                Scripted::Ok => Ok("Story created successfully".into()),
                Scripted::Transport => Err(ApiError::Transport("connection refused".into())),
                Scripted::Rejected(message) => Err(ApiError::Rejected { status: 400, message: message.into() }),
            }
        }

        async fn list_stories(&self, _with_location: bool) -> Result<Vec<Story>, ApiError> {
            Ok(Vec::new())
        }

        async fn story_detail(&self, id: &str) -> Result<Story, ApiError> {
            Err(ApiError::Rejected { status: 404, message: format!("story {id} not found") })
        }
    }
}
