//! cache_get tool implementation.
//!
//! Retrieves a cached title entry by URL.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use titlefix_core::{CacheDb, Error, TitleEntry};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The exact URL the title was resolved for.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// The cached entry. A null title means the resolution failed.
    pub entry: TitleEntry,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let entry = cache
        .get_entry(&params.url)
        .await?
        .ok_or_else(|| Error::CacheMiss(params.url.clone()))?;

    let output = CacheGetOutput { entry };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
