//! Story, favorite, and pending-submission records.
//!
//! DESIGN
//! ======
//! `Story` mirrors the remote API shape (camelCase on the wire). Favorites
//! wrap a story with a local `favoritedAt`. Pending submissions are the
//! private, locally persisted form of a `StoryPayload`; the two collections
//! carry no cross references.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::photo::{self, DEFAULT_PHOTO_NAME, PhotoError};

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// REMOTE STORY
// =============================================================================

/// A story as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    /// Author name, also used as the display title.
    pub name: String,
    pub description: String,
    pub photo_url: String,
    pub created_at: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

// =============================================================================
// FAVORITE
// =============================================================================

/// A locally favorited story. Keyed by the remote story id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    #[serde(flatten)]
    pub story: Story,
    /// Milliseconds since epoch when the user favorited the story.
    pub favorited_at: i64,
}

impl FavoriteItem {
    #[must_use]
    pub fn new(story: Story, favorited_at: i64) -> Self {
        Self { story, favorited_at }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.story.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.story.name
    }
}

// =============================================================================
// SUBMISSION PAYLOAD
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("{0} must be a finite number")]
    NonFiniteCoordinate(&'static str),
    #[error("photo must not be empty")]
    EmptyPhoto,
    #[error("stored photo is unreadable: {0}")]
    Photo(#[from] PhotoError),
}

impl crate::error::ErrorCode for PayloadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "E_EMPTY_DESCRIPTION",
            Self::NonFiniteCoordinate(_) => "E_NON_FINITE_COORDINATE",
            Self::EmptyPhoto => "E_EMPTY_PHOTO",
            Self::Photo(_) => "E_PHOTO",
        }
    }
}

/// A file-like photo attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A validated story submission: description, location, and photo.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryPayload {
    description: String,
    lat: f64,
    lon: f64,
    photo: PhotoFile,
}

impl StoryPayload {
    /// Build a payload, enforcing the record invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] for an empty description or photo, or a
    /// non-finite coordinate.
    pub fn new(description: impl Into<String>, lat: f64, lon: f64, photo: PhotoFile) -> Result<Self, PayloadError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(PayloadError::EmptyDescription);
        }
        if !lat.is_finite() {
            return Err(PayloadError::NonFiniteCoordinate("lat"));
        }
        if !lon.is_finite() {
            return Err(PayloadError::NonFiniteCoordinate("lon"));
        }
        if photo.bytes.is_empty() {
            return Err(PayloadError::EmptyPhoto);
        }
        Ok(Self { description, lat, lon, photo })
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    #[must_use]
    pub fn photo(&self) -> &PhotoFile {
        &self.photo
    }

    /// Normalize into the persisted pending form, re-encoding the photo as text.
    #[must_use]
    pub fn to_new_pending(&self) -> NewPendingSubmission {
        NewPendingSubmission {
            description: self.description.clone(),
            lat: self.lat,
            lon: self.lon,
            photo_data: photo::encode_data_url(&self.photo.mime_type, &self.photo.bytes),
            photo_name: self.photo.name.clone(),
            photo_mime_type: self.photo.mime_type.clone(),
        }
    }
}

// =============================================================================
// PENDING SUBMISSION
// =============================================================================

/// Insert form of a pending submission; id and timestamp are store-assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingSubmission {
    pub description: String,
    pub lat: f64,
    pub lon: f64,
    /// Photo as a data URL.
    pub photo_data: String,
    pub photo_name: String,
    pub photo_mime_type: String,
}

/// A queued, not-yet-confirmed story creation. Never mutated in place.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PendingSubmission {
    pub id: i64,
    pub description: String,
    pub lat: f64,
    pub lon: f64,
    pub photo_data: String,
    pub photo_name: String,
    pub photo_mime_type: String,
    pub enqueued_at: i64,
}

impl PendingSubmission {
    /// Rebuild the original submission payload from the stored record.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] if the stored photo cannot be decoded or the
    /// record no longer satisfies the payload invariants.
    pub fn to_payload(&self) -> Result<StoryPayload, PayloadError> {
        let (encoded_mime, bytes) = photo::decode_data_url(&self.photo_data)?;
        let name = if self.photo_name.is_empty() { DEFAULT_PHOTO_NAME } else { &self.photo_name };
        // EDGE: older records may lack the sidecar type; the data URL carries one.
        let mime_type = if self.photo_mime_type.is_empty() { encoded_mime } else { self.photo_mime_type.clone() };
        let photo = PhotoFile { name: name.to_owned(), mime_type, bytes };
        StoryPayload::new(self.description.clone(), self.lat, self.lon, photo)
    }
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
