//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CacheSweepParams, get_impl, sweep_impl};
use crate::tools::{DispatchMessageParams, GetTitleParams, dispatch_impl, get_title_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use titlefix_client::TitleResolver;
use titlefix_core::{AppConfig, CacheDb};

/// The main MCP server handler for titlefix.
#[derive(Clone)]
pub struct TitlefixServer {
    tool_router: ToolRouter<Self>,
    resolver: Arc<TitleResolver>,
    cache: CacheDb,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl TitlefixServer {
    /// Create a new server handler.
    pub fn new(resolver: TitleResolver, cache: CacheDb, config: AppConfig) -> Self {
        Self { tool_router: Self::tool_router(), resolver: Arc::new(resolver), cache, config: Arc::new(config) }
    }

    /// Resolve the full title of a search result.
    #[tool(
        description = "Resolve the full title of a search result URL. Returns {url, title, replace?}; title is null when it cannot be resolved. Pass current_title to learn whether the resolved title should replace it."
    )]
    async fn get_title(&self, params: Parameters<GetTitleParams>) -> Result<CallToolResult, McpError> {
        get_title_impl(&self.resolver, params.0).await
    }

    /// Answer a raw background message.
    #[tool(
        description = "Dispatch a raw message {target: \"background\", type: \"getTitle\", url}. Returns {handled, response}; other message shapes are not handled."
    )]
    async fn dispatch_message(&self, params: Parameters<DispatchMessageParams>) -> Result<CallToolResult, McpError> {
        dispatch_impl(&self.resolver, params.0).await
    }

    /// Look up a cached title entry.
    #[tool(description = "Get the cached title entry for a URL. Fails with CACHE_MISS when the URL is not cached.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.cache, params.0).await
    }

    /// Sweep old or unwanted cache entries.
    #[tool(
        description = "Delete cached titles older than older_than_days and/or whose URL contains domain. With no arguments, sweeps entries past the configured retention."
    )]
    async fn cache_sweep(&self, params: Parameters<CacheSweepParams>) -> Result<CallToolResult, McpError> {
        sweep_impl(&self.cache, self.config.retention(), params.0).await
    }
}

impl ServerHandler for TitlefixServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "titlefix".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
