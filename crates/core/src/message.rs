//! Wire messages exchanged between the resolution service and its callers.
//!
//! Messages arrive as untrusted JSON. They are decoded with serde at the
//! boundary and anything that does not match is ignored rather than rejected,
//! so foreign messages can be left to other listeners.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker for the `target` field of background messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundTarget {
    #[serde(rename = "background")]
    Background,
}

/// Messages handled by the title resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackgroundMessage {
    /// `{ "target": "background", "type": "getTitle", "url": "..." }`
    GetTitle { target: BackgroundTarget, url: String },
}

/// Response to a [`BackgroundMessage`]: the title, or `null` when unresolved.
pub type BackgroundResponse = Option<String>;

impl BackgroundMessage {
    pub fn get_title(url: impl Into<String>) -> Self {
        Self::GetTitle { target: BackgroundTarget::Background, url: url.into() }
    }

    /// Decode an untrusted message. Returns `None` for any other shape.
    pub fn decode(message: &Value) -> Option<Self> {
        Self::deserialize(message).ok()
    }

    pub fn url(&self) -> &str {
        match self {
            Self::GetTitle { url, .. } => url,
        }
    }
}

/// Parsing requests sent to the parser delegate.
///
/// Each variant carries the raw HTML to parse. A `target` field, if present,
/// is tolerated and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OffscreenMessage {
    /// Text content of the first `<title>`.
    QueryTitle { html: String },
    /// `charset` attribute of the first `<meta charset>`.
    QueryCharset { html: String },
    /// `content` attribute of `<meta http-equiv="Content-Type">`.
    QueryContentType { html: String },
    /// Document text with a newline after every `<br>` and `<p>`.
    PrettyTwitter { html: String },
}

/// Response from the parser delegate.
pub type OffscreenResponse = Option<String>;

impl OffscreenMessage {
    /// Decode an untrusted message. Returns `None` for any other shape.
    pub fn decode(message: &Value) -> Option<Self> {
        Self::deserialize(message).ok()
    }

    pub fn html(&self) -> &str {
        match self {
            Self::QueryTitle { html }
            | Self::QueryCharset { html }
            | Self::QueryContentType { html }
            | Self::PrettyTwitter { html } => html,
        }
    }

    /// Wire name of the operation, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QueryTitle { .. } => "queryTitle",
            Self::QueryCharset { .. } => "queryCharset",
            Self::QueryContentType { .. } => "queryContentType",
            Self::PrettyTwitter { .. } => "prettyTwitter",
        }
    }
}
