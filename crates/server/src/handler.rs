//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    MealCaloriesParams, ProductCaloriesParams, meal_calories_impl, product_calories_impl, refresh_products_impl,
};

use caltrack_client::{ProductFinder, ProductUpdater};
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

/// The main MCP server handler for caltrack.
#[derive(Clone)]
pub struct CaltrackServer {
    tool_router: ToolRouter<Self>,
    finder: ProductFinder,
    updater: ProductUpdater,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CaltrackServer {
    /// Create a new server handler.
    pub fn new(finder: ProductFinder, updater: ProductUpdater) -> Self {
        Self { tool_router: Self::tool_router(), finder, updater }
    }

    /// Look up calories per 100 g/ml of a product.
    #[tool(description = "Calories per 100 g/ml of a product. Served from the local cache, \
                          falling back to the nutrition API for unknown products.")]
    async fn product_calories(&self, params: Parameters<ProductCaloriesParams>) -> Result<CallToolResult, McpError> {
        product_calories_impl(&self.finder, params.0).await
    }

    /// Calories of a portion of a product.
    #[tool(description = "Calories of a portion of a product, rounded to a whole number. \
                          portion_size is in grams or milliliters.")]
    async fn meal_calories(&self, params: Parameters<MealCaloriesParams>) -> Result<CallToolResult, McpError> {
        meal_calories_impl(&self.finder, params.0).await
    }

    /// Refresh every cached product from the nutrition API.
    #[tool(description = "Re-fetch calories for every cached product in batches and overwrite changed values. \
                          Returns a summary of the run.")]
    async fn refresh_products(&self) -> Result<CallToolResult, McpError> {
        refresh_products_impl(&self.updater).await
    }
}

impl ServerHandler for CaltrackServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "caltrack".into(),
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
