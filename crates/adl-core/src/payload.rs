//! Asset payload: what to download and how to credit it.
//!
//! Payloads arrive as small JSON objects, usually produced by a browser
//! userscript and copied to the clipboard with a `unity-asset-payload::`
//! prefix:
//!
//! ```text
//! unity-asset-payload::{"name":"Chair","creatorName":"someone","license":"CC-BY",
//!   "url":"https://example.com/chair","downloadUrl":"https://example.com/chair.zip"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker placed in front of the JSON object by payload producers.
pub const PAYLOAD_PREFIX: &str = "unity-asset-payload::";

/// Immutable description of one asset to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Destination folder name and attribution title.
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "CreatorName")]
    pub creator_name: Option<String>,
    #[serde(default, alias = "License")]
    pub license: Option<String>,
    /// Page or listing the asset came from.
    #[serde(default, rename = "url", alias = "Url")]
    pub source_url: Option<String>,
    /// Archive to fetch.
    #[serde(alias = "DownloadUrl")]
    pub download_url: String,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload field `{0}` is missing or empty")]
    MissingField(&'static str),
    #[error("invalid download URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Payload {
    /// Parse payload text, with or without the `unity-asset-payload::` prefix,
    /// and validate required fields.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let json = strip_prefix(text.trim());
        let payload: Payload = serde_json::from_str(json)?;
        payload.validate()?;
        Ok(payload)
    }

    /// `name` must be non-blank and `download_url` an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.name.trim().is_empty() {
            return Err(PayloadError::MissingField("name"));
        }
        if self.download_url.trim().is_empty() {
            return Err(PayloadError::MissingField("downloadUrl"));
        }
        let parsed = url::Url::parse(self.download_url.trim()).map_err(|e| {
            PayloadError::InvalidUrl {
                url: self.download_url.clone(),
                reason: e.to_string(),
            }
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(PayloadError::InvalidUrl {
                url: self.download_url.clone(),
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }
}

/// Drops a leading `unity-asset-payload::` marker (ASCII case-insensitive).
pub fn strip_prefix(text: &str) -> &str {
    let n = PAYLOAD_PREFIX.len();
    match text.get(..n) {
        Some(head) if head.eq_ignore_ascii_case(PAYLOAD_PREFIX) => &text[n..],
        _ => text,
    }
}

/// Finds `unity-asset-payload::{…}` anywhere in `text` and returns the JSON
/// object. The object must run to the end of the text.
pub fn find_payload_json(text: &str) -> Option<&str> {
    let lowered = text.to_ascii_lowercase();
    let start = lowered.find(PAYLOAD_PREFIX)? + PAYLOAD_PREFIX.len();
    let json = text[start..].trim_end();
    if json.len() > 2 && json.starts_with('{') && json.ends_with('}') {
        Some(json)
    } else {
        None
    }
}
