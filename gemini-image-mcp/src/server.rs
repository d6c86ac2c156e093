//! MCP Server implementation for the image server.
//!
//! This module provides the MCP server handler that exposes:
//! - `generate_image` tool for text-to-image, editing and composition
//! - `validate_image` tool for inspecting a file on disk
//! - Resources for models and error codes

use crate::handler::{GenerateImageParams, GenerationError, ImageHandler, ValidationError};
use crate::report::GenerationResult;
use crate::resources;
use crate::validate::{self, ValidationReport};
use gemini_image_mcp_common::config::Config;
use rmcp::{
    model::{
        CallToolResult, Content, ListResourcesResult, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    handler: ImageHandler,
    config: Config,
}

/// Tool parameters for validate_image.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateImageToolParams {
    /// Path of the image file to inspect
    pub path: String,
}

impl ImageServer {
    /// Create a new ImageServer backed by the Gemini API.
    pub fn new(config: Config) -> Self {
        let handler = ImageHandler::new(&config);
        Self::with_handler(handler, config)
    }

    /// Create a server around an existing handler.
    pub fn with_handler(handler: ImageHandler, config: Config) -> Self {
        Self { handler, config }
    }

    /// Run `generate_image` from raw tool arguments.
    ///
    /// Argument errors are reported as an `INVALID_INPUT` result, not as a
    /// protocol error.
    pub async fn generate_image(&self, arguments: Option<Map<String, Value>>) -> GenerationResult {
        let args = Value::Object(arguments.unwrap_or_default());
        let outcome = match serde_json::from_value::<GenerateImageParams>(args) {
            Ok(params) => {
                info!(count = params.count, images = params.images.len(), "Generating image");
                self.handler.generate_images(params).await
            }
            Err(e) => Err(GenerationError::invalid_input(vec![ValidationError::new(
                "arguments",
                e.to_string(),
            )])),
        };
        GenerationResult::from_outcome(outcome)
    }

    /// Run `validate_image` for a path.
    pub async fn validate_image(&self, params: ValidateImageToolParams) -> ValidationReport {
        info!(path = %params.path, "Validating image");
        validate::validate_image(Path::new(params.path.trim()), self.config.min_image_dimension).await
    }
}

fn json_content<T: Serialize>(value: &T) -> Result<Vec<Content>, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize result: {}", e), None)
    })?;
    Ok(vec![Content::text(text)])
}

fn input_schema<T: JsonSchema>() -> Arc<Map<String, Value>> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema).unwrap_or_default() {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(Map::new()),
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using the Gemini API. \
                 Use generate_image to create images from a prompt, edit a reference image, \
                 or compose several images; results are written to outputPath. \
                 Use validate_image to check that a file on disk is a decodable image."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_ {
        async move {
            use rmcp::model::{ListToolsResult, Tool};

            Ok(ListToolsResult {
                tools: vec![
                    Tool {
                        name: Cow::Borrowed("generate_image"),
                        description: Some(Cow::Borrowed(
                            "Generate images with Gemini. Provide a prompt for text-to-image, \
                             one image plus a prompt to edit, or several images to compose. \
                             Images may be file paths, base64 data, or data URLs. \
                             Existing files are never overwritten.",
                        )),
                        input_schema: input_schema::<GenerateImageParams>(),
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                    Tool {
                        name: Cow::Borrowed("validate_image"),
                        description: Some(Cow::Borrowed(
                            "Check that a file exists and decodes as an image, and report its \
                             dimensions, format and size.",
                        )),
                        input_schema: input_schema::<ValidateImageToolParams>(),
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                ],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                "generate_image" => {
                    let result = self.generate_image(params.arguments).await;
                    let content = json_content(&result)?;
                    if result.success {
                        Ok(CallToolResult::success(content))
                    } else {
                        Ok(CallToolResult::error(content))
                    }
                }
                "validate_image" => {
                    let tool_params: ValidateImageToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(Value::Object(args)))
                        .transpose()
                        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    let report = self.validate_image(tool_params).await;
                    Ok(CallToolResult::success(json_content(&report)?))
                }
                _ => Err(McpError::invalid_params(format!("Unknown tool: {}", params.name), None)),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            let resource = |uri: &str, name: &str, description: &str| rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: uri.to_string(),
                    name: name.to_string(),
                    title: None,
                    description: Some(description.to_string()),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            Ok(ListResourcesResult {
                resources: vec![
                    resource(
                        resources::MODELS_URI,
                        "Available Image Models",
                        "Gemini image models, their aliases and the configured default",
                    ),
                    resource(
                        resources::ERROR_CODES_URI,
                        "Error Codes",
                        "Error codes returned by generate_image and what they mean",
                    ),
                ],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = match uri.as_str() {
                resources::MODELS_URI => {
                    resources::models_resource_json(&self.handler.settings().default_model)
                }
                resources::ERROR_CODES_URI => resources::error_codes_resource_json(),
                _ => {
                    return Err(McpError::resource_not_found(
                        format!("Unknown resource: {}", uri),
                        None,
                    ));
                }
            };

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}
