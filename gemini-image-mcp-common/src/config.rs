//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;
use std::fmt;

/// Primary environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Secondary variable consulted when `GEMINI_API_KEY` is unset.
pub const FALLBACK_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Default root of the Gemini Developer API.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default image model used when a request does not override it.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Smallest width/height the validation tool accepts.
pub const DEFAULT_MIN_IMAGE_DIMENSION: u32 = 10;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// API key sent with every generation request (required)
    pub api_key: String,
    /// Root URL of the generation API
    pub api_base_url: String,
    /// Model used when the caller does not pick one
    pub default_model: String,
    /// Minimum width and height for a generated image to count as valid
    pub min_image_dimension: u32,
}

/// Load a `.env` file into the process environment, if one exists.
///
/// Variables already set are left alone. Call this before parsing CLI
/// arguments so env-backed flags such as `--port` see `.env` values too.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    dotenvy::dotenv().ok()
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if no API key is set, or
    /// `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR)
            .or_else(|| get(FALLBACK_API_KEY_VAR))
            .ok_or_else(|| ConfigError::missing_env_var(API_KEY_VAR))?;

        let api_base_url = get("GEMINI_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let default_model =
            get("GEMINI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        let min_image_dimension = match get("MIN_IMAGE_DIMENSION") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::invalid_value("MIN_IMAGE_DIMENSION", e.to_string())
            })?,
            None => DEFAULT_MIN_IMAGE_DIMENSION,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_base_url,
            default_model,
            min_image_dimension,
        })
    }

    /// Get the `generateContent` endpoint URL for a given model.
    pub fn generate_content_endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, model
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("default_model", &self.default_model)
            .field("min_image_dimension", &self.min_image_dimension)
            .finish()
    }
}
