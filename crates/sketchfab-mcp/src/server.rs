use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};

use crate::schema::{DownloadRequest, ModelDetailsRequest, SearchRequest};
use crate::tools::ToolContext;

const INSTRUCTIONS: &str = "Sketchfab MCP server - find and fetch 3D models from Sketchfab.\n\n\
    - search: find models by query, tags or categories\n\
    - model-details: show metadata for a model ID from the search results\n\
    - download: save a downloadable model to disk (gltf, glb, usdz or source)\n\n\
    Requires a Sketchfab API key (SKETCHFAB_API_KEY or --api-key).";

#[derive(Clone)]
pub struct SketchfabServer {
    tools: Arc<ToolContext>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SketchfabServer {
    pub fn new(tools: Arc<ToolContext>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "search",
        description = "Search Sketchfab for 3D models by keywords, tags or categories. Returns model names, IDs and whether each can be downloaded."
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools.search(request.into()).await.into())
    }

    #[tool(
        name = "model-details",
        description = "Get details about a Sketchfab model: creator, license, stats, tags, thumbnail and description."
    )]
    async fn model_details(
        &self,
        Parameters(request): Parameters<ModelDetailsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools.model_details(&request.model_id).await.into())
    }

    #[tool(
        name = "download",
        description = "Download a Sketchfab model to local disk. Falls back to another available format when the requested one is missing."
    )]
    async fn download(
        &self,
        Parameters(request): Parameters<DownloadRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools.download(request.into()).await.into())
    }
}

#[tool_handler]
impl ServerHandler for SketchfabServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sketchfab-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
