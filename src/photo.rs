//! Transportable text encoding for photo payloads.
//!
//! Pending submissions store photos as data URLs
//! (`data:<mime>;base64,<payload>`), the same form a browser file reader
//! produces, so a queued record survives any text-only serialization boundary.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub const DEFAULT_PHOTO_NAME: &str = "photo.jpg";
pub const DEFAULT_PHOTO_MIME: &str = "image/jpeg";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("photo encoding is not a data URL")]
    NotDataUrl,
    #[error("photo data URL is not base64 encoded")]
    NotBase64,
    #[error("photo payload decode failed: {0}")]
    Decode(String),
}

impl crate::error::ErrorCode for PhotoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotDataUrl => "E_PHOTO_NOT_DATA_URL",
            Self::NotBase64 => "E_PHOTO_NOT_BASE64",
            Self::Decode(_) => "E_PHOTO_DECODE",
        }
    }
}

/// Encode raw bytes as a data URL for the given MIME type.
#[must_use]
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime = if mime_type.is_empty() { DEFAULT_PHOTO_MIME } else { mime_type };
    let payload = STANDARD.encode(bytes);
    let mut out = String::with_capacity(DATA_PREFIX.len() + mime.len() + BASE64_MARKER.len() + payload.len());
    out.push_str(DATA_PREFIX);
    out.push_str(mime);
    out.push_str(BASE64_MARKER);
    out.push_str(&payload);
    out
}

/// Decode a data URL back into `(mime_type, bytes)`.
///
/// # Errors
///
/// Returns a [`PhotoError`] when the text is not a base64 data URL or the
/// payload is not valid base64.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), PhotoError> {
    let rest = data_url.strip_prefix(DATA_PREFIX).ok_or(PhotoError::NotDataUrl)?;
    let (mime, payload) = rest.split_once(BASE64_MARKER).ok_or(PhotoError::NotBase64)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PhotoError::Decode(e.to_string()))?;
    let mime = if mime.is_empty() { DEFAULT_PHOTO_MIME } else { mime };
    Ok((mime.to_owned(), bytes))
}

/// Best-effort MIME type from a file name extension.
#[must_use]
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => DEFAULT_PHOTO_MIME,
    }
}

#[cfg(test)]
#[path = "photo_test.rs"]
mod tests;
