//! cache_sweep tool implementation.
//!
//! Removes cache entries by age and/or domain.

use std::time::Duration;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use titlefix_core::{CacheDb, Error};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Parameters for the cache_sweep tool.
///
/// With neither field set, entries older than the configured retention are swept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepParams {
    /// Sweep entries older than this many days.
    #[serde(default)]
    pub older_than_days: Option<u64>,

    /// Delete entries whose URL contains this domain.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Output from the cache_sweep tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_sweep tool.
pub async fn sweep_impl(
    cache: &CacheDb, default_retention: Duration, params: CacheSweepParams,
) -> Result<CallToolResult, McpError> {
    let mut deleted_total = 0u64;

    let retention = match (params.older_than_days, &params.domain) {
        (Some(days), _) => {
            let secs = days
                .checked_mul(SECS_PER_DAY)
                .ok_or_else(|| Error::InvalidInput(format!("older_than_days out of range: {days}")))?;
            Some(Duration::from_secs(secs))
        }
        (None, None) => Some(default_retention),
        (None, Some(_)) => None,
    };

    if let Some(retention) = retention {
        deleted_total += cache.sweep(retention).await?;
    }

    if let Some(domain) = params.domain {
        deleted_total += cache.purge_by_domain(&domain).await?;
    }

    let output = CacheSweepOutput { deleted: deleted_total };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
