//! Image generation handler.
//!
//! This module provides the `ImageHandler` struct and parameter types for
//! `generate_image`. A request is validated, its output paths are planned and
//! pre-checked, then each batch unit runs sequentially: assemble content,
//! call the model, decode the first inline image, write it exclusively and
//! read back its dimensions.

use crate::content::{self, AssembleError};
use crate::gemini::{GeminiClient, ImageModel};
use crate::input::{ImageInput, ImageReference, ResolveError};
use crate::output::{self, OutputError, OutputPlan};
use crate::report;
use gemini_image_mcp_common::config::Config;
use gemini_image_mcp_common::error::Error;
use gemini_image_mcp_common::models::ModelRegistry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Minimum number of images per request.
pub const MIN_COUNT: u32 = 1;

/// Maximum number of images per request.
pub const MAX_COUNT: u32 = 10;

/// `generate_image` tool arguments.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateImageParams {
    /// Text prompt. Optional when reference images are supplied.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Reference images for editing or composition, in order.
    #[serde(default)]
    pub images: Vec<ImageInput>,

    /// Where to save the image. With count > 1, files are numbered
    /// `name-1.ext`, `name-2.ext`, ...
    #[serde(rename = "outputPath")]
    pub output_path: String,

    /// Number of images to generate (1-10).
    #[serde(default = "default_count")]
    pub count: u32,

    /// Generation options.
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

/// Optional per-request overrides.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GenerationOptions {
    /// Model id or alias (e.g. "nano-banana"). Unknown ids are sent as-is.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_count() -> u32 {
    1
}

/// Validation error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl GenerateImageParams {
    /// Validate against the default count limit.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        self.validate_with_limit(MAX_COUNT)
    }

    /// Validate the parameters, collecting every failure.
    pub fn validate_with_limit(&self, max_count: u32) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !(MIN_COUNT..=max_count).contains(&self.count) {
            errors.push(ValidationError::new(
                "count",
                format!("must be between {} and {}, got {}", MIN_COUNT, max_count, self.count),
            ));
        }

        if self.prompt().is_none() && self.images.is_empty() {
            errors.push(ValidationError::new(
                "prompt",
                "a prompt or at least one image is required",
            ));
        }

        if self.output_path.trim().is_empty() {
            errors.push(ValidationError::new("outputPath", "cannot be empty"));
        }

        for (i, image) in self.images.iter().enumerate() {
            if image.data.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("images[{}].data", i),
                    "cannot be empty",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The prompt, if present and not blank.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// The requested model override, if present and not blank.
    pub fn model_override(&self) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|o| o.model.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Values the orchestrator needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub default_model: String,
    pub max_count: u32,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_model: config.default_model.clone(),
            max_count: MAX_COUNT,
        }
    }
}

/// Why a request (or a batch unit) failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Api(#[from] Error),

    #[error("Model returned unusable image data: {0}")]
    InvalidImageData(#[source] ResolveError),

    #[error("Failed to read dimensions of {}: {message}", path.display())]
    Metadata { path: PathBuf, message: String },

    #[error("No images were generated ({attempted} attempt(s))")]
    NoImagesGenerated { attempted: usize },
}

impl GenerationError {
    pub fn invalid_input(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        GenerationError::InvalidInput { message, errors }
    }

    /// Collisions abort the whole request no matter how many units succeeded.
    fn aborts_batch(&self) -> bool {
        matches!(self, GenerationError::Output(OutputError::FileExists { .. }))
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One image written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedImage {
    pub path: String,
    pub dimensions: Dimensions,
}

/// Image generation handler.
#[derive(Clone)]
pub struct ImageHandler {
    client: Arc<dyn ImageModel>,
    settings: GenerationSettings,
}

impl ImageHandler {
    /// Create a handler that talks to the Gemini API.
    #[instrument(level = "debug", name = "image_handler_new", skip_all)]
    pub fn new(config: &Config) -> Self {
        debug!(default_model = %config.default_model, "Initializing ImageHandler");
        Self::with_client(
            Arc::new(GeminiClient::new(config)),
            GenerationSettings::from_config(config),
        )
    }

    /// Create a handler around any model implementation.
    pub fn with_client(client: Arc<dyn ImageModel>, settings: GenerationSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Resolve the model for a request: override (alias-aware) or default.
    pub fn resolve_model(&self, params: &GenerateImageParams) -> String {
        let requested = params
            .model_override()
            .unwrap_or(&self.settings.default_model);
        ModelRegistry::resolve_or_passthrough(requested)
    }

    /// Run a full `generate_image` request.
    ///
    /// Returns every image written. Unit failures are tolerated once at
    /// least one image exists; before that, or for a path collision, the
    /// failure ends the request.
    #[instrument(level = "info", name = "generate_image", skip(self, params), fields(count = params.count))]
    pub async fn generate_images(
        &self,
        params: GenerateImageParams,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        params
            .validate_with_limit(self.settings.max_count)
            .map_err(GenerationError::invalid_input)?;

        let model = self.resolve_model(&params);
        let references: Vec<ImageReference> =
            params.images.iter().map(ImageReference::from_input).collect();
        let plan = OutputPlan::plan(Path::new(params.output_path.trim()), params.count as usize).await?;

        info!(model = %model, images = references.len(), "Generating images");

        let mut generated = Vec::with_capacity(plan.len());
        for (unit, path) in plan.paths().iter().enumerate() {
            match self
                .run_unit(unit, &model, params.prompt(), &references, path)
                .await
            {
                Ok(Some(image)) => generated.push(image),
                Ok(None) => debug!(unit, "Unit produced no image"),
                Err(err) if err.aborts_batch() || generated.is_empty() => return Err(err),
                Err(err) => {
                    warn!(
                        unit,
                        code = %report::classify_error(&err),
                        error = %err,
                        "Batch unit failed, continuing"
                    );
                }
            }
        }

        if generated.is_empty() {
            return Err(GenerationError::NoImagesGenerated {
                attempted: plan.len(),
            });
        }

        info!(generated = generated.len(), requested = plan.len(), "Generation complete");
        Ok(generated)
    }

    async fn run_unit(
        &self,
        unit: usize,
        model: &str,
        prompt: Option<&str>,
        references: &[ImageReference],
        path: &Path,
    ) -> Result<Option<GeneratedImage>, GenerationError> {
        let parts = content::assemble(prompt, references).await?;
        let response = self.client.generate(model, &parts).await?;

        if response.candidates.is_empty() {
            debug!(unit, reasons = ?response.stop_reasons(), "Response has no candidates");
            return Ok(None);
        }
        for text in response.texts() {
            debug!(unit, text, "Model returned text");
        }

        let mut inline = response.inline_images();
        let Some(image) = inline.next() else {
            debug!(unit, reasons = ?response.stop_reasons(), "Response has no inline image");
            return Ok(None);
        };
        let dropped = inline.count();
        if dropped > 0 {
            debug!(unit, dropped, "Ignoring additional inline images in response");
        }

        let decoded = ImageReference::InlineBase64 {
            data: image.data.clone(),
            mime_type: None,
        }
        .resolve()
        .await
        .map_err(GenerationError::InvalidImageData)?;

        output::ensure_absent(path).await?;
        output::write_exclusive(path, &decoded.bytes).await?;
        let dimensions = read_dimensions(path).await?;

        info!(
            unit,
            path = %path.display(),
            width = dimensions.width,
            height = dimensions.height,
            "Saved generated image"
        );

        Ok(Some(GeneratedImage {
            path: path.display().to_string(),
            dimensions,
        }))
    }
}

/// Decode just enough of a written file to learn its size.
async fn read_dimensions(path: &Path) -> Result<Dimensions, GenerationError> {
    let owned = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        image::ImageReader::open(&owned)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(std::io::Error::other)
    })
    .await;

    match result {
        Ok(Ok((width, height))) => Ok(Dimensions { width, height }),
        Ok(Err(e)) => Err(GenerationError::Metadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(join) => Err(GenerationError::Metadata {
            path: path.to_path_buf(),
            message: join.to_string(),
        }),
    }
}
