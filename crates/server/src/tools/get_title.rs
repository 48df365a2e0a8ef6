//! get_title tool implementation.
//!
//! Resolves the full title of a search result URL.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use titlefix_client::{TitleResolver, should_replace};
use titlefix_core::Error;

/// Parameters for the get_title tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetTitleParams {
    /// The search result URL.
    pub url: String,

    /// The title currently displayed, possibly truncated with an ellipsis.
    #[serde(default)]
    pub current_title: Option<String>,
}

/// Output from the get_title tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetTitleOutput {
    /// The requested URL.
    pub url: String,
    /// The full title, or null when it could not be resolved.
    pub title: Option<String>,
    /// Whether the resolved title should replace `current_title`.
    /// Only present when `current_title` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
}

/// Implementation of the get_title tool.
pub async fn get_title_impl(resolver: &TitleResolver, params: GetTitleParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let title = resolver.resolve(&params.url).await;
    let replace = params
        .current_title
        .as_deref()
        .map(|current| title.as_deref().is_some_and(|resolved| should_replace(current, resolved)));

    let output = GetTitleOutput { url: params.url, title, replace };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
