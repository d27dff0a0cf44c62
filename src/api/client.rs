//! reqwest-backed story API client.
//!
//! The bearer credential is handed to the constructor; the client never
//! looks it up on its own. Response classification lives in the pure
//! `parse_response` so it can be tested without a server.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, StoryApi};
use crate::config::{ApiTimeouts, ConfigError};
use crate::connectivity::Reachability;
use crate::models::{Story, StoryPayload};

/// Bearer credential. `Debug` never prints the secret.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct StoryClient {
    http: reqwest::Client,
    base_url: String,
    token: BearerToken,
}

impl StoryClient {
    /// Build a client for `base_url` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, token: BearerToken, timeouts: ApiTimeouts) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url, token })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .bearer_auth(&self.token.0)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        debug!(status, bytes = body.len(), "story api response");
        parse_response(status, &body)
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    warn!(error = %e, timeout = e.is_timeout(), connect = e.is_connect(), "story api unreachable");
    ApiError::Transport(e.to_string())
}

fn photo_part(payload: &StoryPayload) -> Part {
    let photo = payload.photo();
    let part = Part::bytes(photo.bytes.clone()).file_name(photo.name.clone());
    match part.mime_str(&photo.mime_type) {
        Ok(part) => part,
        // EDGE: unparseable MIME sidecar; let the server sniff the bytes.
        Err(_) => Part::bytes(photo.bytes.clone()).file_name(photo.name.clone()),
    }
}

fn story_form(payload: &StoryPayload) -> Form {
    Form::new()
        .text("description", payload.description().to_owned())
        .text("lat", payload.lat().to_string())
        .text("lon", payload.lon().to_string())
        .part("photo", photo_part(payload))
}

#[async_trait::async_trait]
impl StoryApi for StoryClient {
    async fn create_story(&self, payload: &StoryPayload) -> Result<String, ApiError> {
        let url = format!("{}/stories", self.base_url);
        let envelope: Envelope = self.send(self.http.post(url).multipart(story_form(payload))).await?;
        Ok(envelope.message)
    }

    async fn list_stories(&self, with_location: bool) -> Result<Vec<Story>, ApiError> {
        let mut url = format!("{}/stories", self.base_url);
        if with_location {
            url.push_str("?location=1");
        }
        let listing: StoriesResponse = self.send(self.http.get(url)).await?;
        Ok(listing.list_story)
    }

    async fn story_detail(&self, id: &str) -> Result<Story, ApiError> {
        let url = format!("{}/stories/{id}", self.base_url);
        let detail: DetailResponse = self.send(self.http.get(url)).await?;
        Ok(detail.story)
    }
}

#[async_trait::async_trait]
impl Reachability for StoryClient {
    /// Any HTTP answer from the base URL counts as reachable.
    async fn reachable(&self) -> bool {
        self.http.get(&self.base_url).send().await.is_ok()
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorProbe {
    error: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoriesResponse {
    #[serde(default)]
    list_story: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    story: Story,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classify a received response.
///
/// - 5xx: transport failure (the service is not answering for itself).
/// - `{"error": true}` body: application rejection.
/// - other non-2xx: rejection when the body parses, transport failure when it
///   does not (proxies, offline fallbacks).
/// - 2xx with an unreadable body: rejection; the server was reached and may
///   have acted, so the request must not be replayed blindly.
fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if status >= 500 {
        return Err(ApiError::Transport(format!("server unavailable: status {status}")));
    }

    let probe = serde_json::from_str::<ErrorProbe>(body).ok();
    let success = (200..300).contains(&status);

    match probe {
        Some(ErrorProbe { error: true, message }) => {
            return Err(ApiError::Rejected { status, message: message.unwrap_or_else(|| "request rejected".into()) });
        }
        Some(ErrorProbe { message, .. }) if !success => {
            return Err(ApiError::Rejected { status, message: message.unwrap_or_else(|| format!("status {status}")) });
        }
        None if !success => {
            return Err(ApiError::Transport(format!("unexpected status {status} without api payload")));
        }
        _ => {}
    }

    serde_json::from_str::<T>(body)
        .map_err(|e| ApiError::Rejected { status, message: format!("malformed response: {e}") })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
