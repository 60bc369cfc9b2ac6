//! MCP Server implementation.
//!
//! `McpServer` owns the immutable tool registry and the resource and prompt
//! services built from configuration. It implements the rmcp
//! `ServerHandler` used by the STDIO transport and exposes the same
//! operations as plain async methods for the HTTP transport.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::{
    prompts::{PromptError, PromptService},
    resources::{ResourceError, ResourceService},
    tools::{ToolError, ToolRegistry, build_tool_router},
};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The enabled tools.
    tool_registry: Arc<ToolRegistry>,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,

    /// Service for handling prompt-related requests.
    prompt_service: Arc<PromptService>,

    /// Tool router for handling tool calls over rmcp.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let tool_registry = Arc::new(ToolRegistry::new(config.clone()));
        let resource_service = Arc::new(ResourceService::new(&config.resources));
        let prompt_service = Arc::new(PromptService::new(&config.prompts));

        info!("Registered tools: {}", tool_registry.tool_names().join(", "));

        Self {
            tool_router: build_tool_router::<Self>(&tool_registry),
            config,
            tool_registry,
            resource_service,
            prompt_service,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Human-readable usage notes sent to clients on initialization.
    pub fn instructions(&self) -> String {
        let branding = &self.config.branding;
        format!(
            "{} - {}. Tools: {}.",
            branding.name,
            branding.description,
            self.tool_registry.tool_names().join(", ")
        )
    }

    // ========================================================================
    // Transport-independent operations
    // ========================================================================

    /// List all enabled tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_registry.tools()
    }

    /// Names of the enabled tools.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tool_registry.tool_names()
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ToolError> {
        self.tool_registry.call_tool(name, arguments).await
    }

    /// List all enabled resources.
    pub async fn list_resources(&self) -> Vec<Resource> {
        self.resource_service.list_resources().await
    }

    /// List all resource templates.
    pub async fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        self.resource_service.list_resource_templates().await
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        self.resource_service.read_resource(uri).await
    }

    /// List all prompts.
    pub async fn list_prompts(&self) -> Vec<Prompt> {
        self.prompt_service.list_prompts().await
    }

    /// Render a prompt. Argument values that are not strings are rendered
    /// as their JSON text.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<GetPromptResult, PromptError> {
        self.prompt_service
            .get_prompt(name, arguments.map(prompt_arguments))
            .await
    }
}

fn prompt_arguments(map: Map<String, Value>) -> HashMap<String, String> {
    map.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}

fn resource_error(err: ResourceError) -> McpError {
    match err {
        ResourceError::NotFound(_) => McpError::resource_not_found(err.to_string(), None),
        ResourceError::InvalidUri(_) => McpError::invalid_params(err.to_string(), None),
        ResourceError::Io(_) | ResourceError::Internal(_) => {
            McpError::internal_error(err.to_string(), None)
        }
    }
}

fn prompt_error(err: PromptError) -> McpError {
    if err.is_client_error() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.config.server.name.clone();
        server_info.version = self.config.server.version.clone();
        server_info.title = Some(self.config.branding.name.clone());

        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info,
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        let resources = self.resource_service.list_resources().await;
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        info!("Listing resource templates");
        let templates = self.resource_service.list_resource_templates().await;
        Ok(ListResourceTemplatesResult {
            resource_templates: templates,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resource_service
            .read_resource(&request.uri)
            .await
            .map_err(resource_error)
    }

    #[instrument(skip(self, _context))]
    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        info!("Listing prompts");
        let prompts = self.prompt_service.list_prompts().await;
        Ok(ListPromptsResult {
            prompts,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        info!("Getting prompt: {}", request.name);
        self.prompt_service
            .get_prompt(&request.name, request.arguments.map(prompt_arguments))
            .await
            .map_err(prompt_error)
    }
}
