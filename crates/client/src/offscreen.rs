//! Listener of the parser delegate context.
//!
//! The delegate only ever sees serialized messages; it decodes them, runs the
//! requested DOM operation and answers with `string | null`.

use serde_json::Value;
use titlefix_core::{OffscreenMessage, OffscreenResponse};

use crate::dom;

/// Run a decoded parsing request in this context.
pub fn handle(message: &OffscreenMessage) -> OffscreenResponse {
    tracing::trace!(kind = message.kind(), html_len = message.html().len(), "delegate request");
    match message {
        OffscreenMessage::QueryTitle { html } => {
            let title = dom::query_title(html);
            tracing::trace!(?title, "delegate found title");
            title
        }
        OffscreenMessage::QueryCharset { html } => dom::query_charset(html),
        OffscreenMessage::QueryContentType { html } => dom::query_content_type(html),
        OffscreenMessage::PrettyTwitter { html } => dom::pretty_text(html),
    }
}

/// Handle a raw message. Unrelated messages are ignored and answered with `None`.
pub fn on_message(message: &Value) -> OffscreenResponse {
    let Some(message) = OffscreenMessage::decode(message) else {
        tracing::debug!("delegate ignored unrelated message");
        return None;
    };
    handle(&message)
}
