//! dispatch_message tool implementation.
//!
//! Accepts a raw background message and answers it the way the message
//! listener does. Messages of any other shape are reported as not handled.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use titlefix_client::{Dispatch, TitleResolver, on_message};
use titlefix_core::Error;

/// Parameters for the dispatch_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DispatchMessageParams {
    /// The raw message, e.g. `{"target": "background", "type": "getTitle", "url": "..."}`.
    pub message: serde_json::Value,
}

/// Output from the dispatch_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DispatchMessageOutput {
    /// Whether the message was a background message.
    pub handled: bool,
    /// The response to the message; null when unhandled or unresolved.
    pub response: Option<String>,
}

impl From<Dispatch> for DispatchMessageOutput {
    fn from(dispatch: Dispatch) -> Self {
        match dispatch {
            Dispatch::Ignored => Self { handled: false, response: None },
            Dispatch::Handled(response) => Self { handled: true, response },
        }
    }
}

/// Implementation of the dispatch_message tool.
pub async fn dispatch_impl(resolver: &TitleResolver, params: DispatchMessageParams) -> Result<CallToolResult, McpError> {
    let output = DispatchMessageOutput::from(on_message(resolver, &params.message).await);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
