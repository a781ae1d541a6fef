//! MCP Server implementation for the image server.
//!
//! Exposes a single `generate_image` tool backed by Amazon Nova Canvas and
//! reports progress to the client through protocol log notifications.

use crate::handler::{
    GenerateImageParams, ImageHandler, TOOL_NAME, assemble_content, validation_failure,
};
use bedrock_mcp_common::client_log::{ClientLogger, PeerLogger};
use bedrock_mcp_common::error::Error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info};

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "mcp-server-amazon-bedrock";

/// Logger name attached to client log notifications.
const LOGGER_NAME: &str = "bedrock-mcp-image";

const TOOL_DESCRIPTION: &str = "Generate image(s) using Amazon Nova Canvas model. \
     The returned data is Base64-encoded string that represent each image that was generated.";

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    handler: ImageHandler,
}

impl ImageServer {
    /// Create a server around a ready handler.
    pub fn new(handler: ImageHandler) -> Self {
        Self { handler }
    }

    /// The `generate_image` tool descriptor.
    pub fn tool() -> Tool {
        use schemars::schema_for;

        let schema = schema_for!(GenerateImageParams);
        let input_schema = match serde_json::to_value(&schema) {
            Ok(serde_json::Value::Object(map)) => Arc::new(map),
            _ => Arc::new(JsonObject::new()),
        };

        Tool {
            name: Cow::Borrowed(TOOL_NAME),
            description: Some(Cow::Borrowed(TOOL_DESCRIPTION)),
            input_schema,
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: None,
        }
    }

    /// Route one tool call.
    ///
    /// Unknown names are rejected before validation, and invalid arguments
    /// before any upstream call.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        logger: &dyn ClientLogger,
    ) -> Result<CallToolResult, McpError> {
        if name != TOOL_NAME {
            return Err(Error::UnknownTool(name.to_string()).into());
        }

        let params = GenerateImageParams::from_arguments(arguments.as_ref())
            .map_err(|errors| validation_failure(&errors))?;

        info!(prompt = %params.prompt, "Generating image");

        match self.handler.generate_image(&params, logger).await {
            Ok(images) => Ok(CallToolResult::success(assemble_content(
                &params.prompt,
                images,
            ))),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Image generation failed");
                Err(e.into())
            }
        }
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using Amazon Bedrock Nova Canvas. \
                 Use generate_image to create images from text prompts."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_logging()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: vec![Self::tool()],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let logger = PeerLogger::new(context.peer, LOGGER_NAME);
            self.dispatch(&params.name, params.arguments, &logger).await
        }
    }
}
