//! Entry point for raw messages addressed to the resolution service.

use serde_json::Value;
use titlefix_core::{BackgroundMessage, BackgroundResponse};

use crate::resolve::TitleResolver;

/// What the listener did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a background message; another listener may handle it.
    Ignored,
    /// Handled; the payload is the response for the sender.
    Handled(BackgroundResponse),
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled(_))
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Dispatch::Handled(title) => title.as_deref(),
            Dispatch::Ignored => None,
        }
    }
}

/// Decode a raw message and resolve it if it is a `getTitle` request.
pub async fn on_message(resolver: &TitleResolver, message: &Value) -> Dispatch {
    match BackgroundMessage::decode(message) {
        Some(message) => Dispatch::Handled(resolver.resolve(message.url()).await),
        None => {
            tracing::debug!("ignoring message that is not for the background");
            Dispatch::Ignored
        }
    }
}
