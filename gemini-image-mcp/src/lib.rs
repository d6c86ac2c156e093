//! Gemini Image MCP Server Library
//!
//! Image generation, editing and composition through the Gemini API, with
//! results written to local files.

pub mod content;
pub mod format;
pub mod gemini;
pub mod handler;
pub mod input;
pub mod output;
pub mod report;
pub mod resources;
pub mod server;
pub mod validate;

pub use gemini::{GeminiClient, ImageModel};
pub use handler::{GenerateImageParams, GeneratedImage, GenerationError, GenerationSettings, ImageHandler};
pub use report::{ErrorCode, GenerationResult};
pub use server::ImageServer;
pub use validate::ValidationReport;
