//! Model definitions and registry for Gemini image models.
//!
//! The registry exists for alias resolution and for the `image://models`
//! resource. Identifiers that are not registered are still usable: they are
//! passed to the API unchanged.

use serde::Serialize;

/// Gemini model capable of producing inline image output.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiImageModel {
    /// Full model identifier
    pub id: &'static str,
    /// Model aliases for convenience
    pub aliases: &'static [&'static str],
    /// Short human-readable description
    pub description: &'static str,
    /// Maximum number of reference images accepted in one request
    pub max_reference_images: u8,
}

// =============================================================================
// Static Model Definitions
// =============================================================================

/// Gemini 2.5 Flash Image ("Nano Banana")
pub const GEMINI_2_5_FLASH_IMAGE: GeminiImageModel = GeminiImageModel {
    id: "gemini-2.5-flash-image",
    aliases: &["nano-banana", "gemini-flash-image", "flash-image"],
    description: "Fast image generation and editing",
    max_reference_images: 3,
};

/// Gemini 2.5 Flash Image preview build
pub const GEMINI_2_5_FLASH_IMAGE_PREVIEW: GeminiImageModel = GeminiImageModel {
    id: "gemini-2.5-flash-image-preview",
    aliases: &["flash-image-preview"],
    description: "Preview build of Gemini 2.5 Flash Image",
    max_reference_images: 3,
};

/// Gemini 3 Pro Image preview ("Nano Banana Pro")
pub const GEMINI_3_PRO_IMAGE_PREVIEW: GeminiImageModel = GeminiImageModel {
    id: "gemini-3-pro-image-preview",
    aliases: &["nano-banana-pro", "gemini-pro-image", "pro-image"],
    description: "Higher fidelity generation with multi-image composition",
    max_reference_images: 14,
};

/// All registered image models
pub const GEMINI_IMAGE_MODELS: &[GeminiImageModel] = &[
    GEMINI_2_5_FLASH_IMAGE,
    GEMINI_2_5_FLASH_IMAGE_PREVIEW,
    GEMINI_3_PRO_IMAGE_PREVIEW,
];

// =============================================================================
// Model Registry
// =============================================================================

/// Model registry for resolution and listing.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Resolve a model name or alias to its definition.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use gemini_image_mcp_common::models::ModelRegistry;
    ///
    /// let model = ModelRegistry::resolve("nano-banana").unwrap();
    /// assert_eq!(model.id, "gemini-2.5-flash-image");
    /// assert!(ModelRegistry::resolve("imagen-3").is_none());
    /// ```
    pub fn resolve(name: &str) -> Option<&'static GeminiImageModel> {
        let name = name.trim();
        GEMINI_IMAGE_MODELS.iter().find(|model| {
            model.id.eq_ignore_ascii_case(name)
                || model.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// Resolve an alias to its canonical id, or return the name unchanged.
    ///
    /// ```
    /// use gemini_image_mcp_common::models::ModelRegistry;
    ///
    /// assert_eq!(ModelRegistry::resolve_or_passthrough("nano-banana-pro"), "gemini-3-pro-image-preview");
    /// assert_eq!(ModelRegistry::resolve_or_passthrough("gemini-9-image"), "gemini-9-image");
    /// ```
    pub fn resolve_or_passthrough(name: &str) -> String {
        match Self::resolve(name) {
            Some(model) => model.id.to_string(),
            None => name.trim().to_string(),
        }
    }

    /// List all registered image models.
    pub fn list() -> &'static [GeminiImageModel] {
        GEMINI_IMAGE_MODELS
    }
}
