//! MCP Resources for the image server.
//!
//! - `image://models` - known Gemini image models, with the configured default flagged
//! - `image://error_codes` - the error taxonomy returned in failed results

use crate::report::ErrorCode;
use gemini_image_mcp_common::models::ModelRegistry;
use serde::Serialize;

/// URI of the models resource.
pub const MODELS_URI: &str = "image://models";

/// URI of the error code resource.
pub const ERROR_CODES_URI: &str = "image://error_codes";

/// Information about an available image model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: &'static str,
    pub aliases: Vec<&'static str>,
    pub description: &'static str,
    pub max_reference_images: u8,
    pub is_default: bool,
}

/// One entry of the error taxonomy.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorCodeInfo {
    pub code: ErrorCode,
    pub description: &'static str,
}

/// List registered models. `default_model` may be an alias; it is resolved
/// before comparison.
pub fn list_models(default_model: &str) -> Vec<ModelInfo> {
    let default_id = ModelRegistry::resolve_or_passthrough(default_model);
    ModelRegistry::list()
        .iter()
        .map(|m| ModelInfo {
            id: m.id,
            aliases: m.aliases.to_vec(),
            description: m.description,
            max_reference_images: m.max_reference_images,
            is_default: m.id == default_id,
        })
        .collect()
}

pub fn list_error_codes() -> Vec<ErrorCodeInfo> {
    ErrorCode::ALL
        .iter()
        .map(|code| ErrorCodeInfo {
            code: *code,
            description: code.description(),
        })
        .collect()
}

/// Get models resource as JSON string.
pub fn models_resource_json(default_model: &str) -> String {
    serde_json::to_string_pretty(&list_models(default_model)).unwrap_or_else(|_| "[]".to_string())
}

/// Get error codes resource as JSON string.
pub fn error_codes_resource_json() -> String {
    serde_json::to_string_pretty(&list_error_codes()).unwrap_or_else(|_| "[]".to_string())
}
