//! `validate_image`: inspect an existing file with a full decode.

use crate::handler::Dimensions;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Outcome of inspecting one file. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub exists: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    fn invalid(exists: bool, error: impl Into<String>) -> Self {
        Self {
            exists,
            valid: false,
            dimensions: None,
            format: None,
            file_size_bytes: None,
            error: Some(error.into()),
        }
    }
}

struct Decoded {
    dimensions: Dimensions,
    format: Option<String>,
}

/// Inspect `path`, requiring both dimensions to be at least `min_dimension`.
#[instrument(level = "info", name = "validate_image", skip(path), fields(path = %path.display()))]
pub async fn validate_image(path: &Path, min_dimension: u32) -> ValidationReport {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return ValidationReport::invalid(false, "File does not exist");
        }
        Err(e) => return ValidationReport::invalid(true, e.to_string()),
    };
    if metadata.is_dir() {
        return ValidationReport::invalid(true, "Path is a directory, not an image file");
    }

    let decoded = match decode(path.to_path_buf()).await {
        Ok(d) => d,
        Err(message) => {
            debug!(error = %message, "Image failed to decode");
            return ValidationReport::invalid(true, message);
        }
    };

    let Dimensions { width, height } = decoded.dimensions;
    if width < min_dimension || height < min_dimension {
        return ValidationReport {
            dimensions: Some(decoded.dimensions),
            ..ValidationReport::invalid(
                true,
                format!(
                    "Image too small: {}x{} (minimum {}x{})",
                    width, height, min_dimension, min_dimension
                ),
            )
        };
    }

    ValidationReport {
        exists: true,
        valid: true,
        dimensions: Some(decoded.dimensions),
        format: decoded.format,
        file_size_bytes: Some(metadata.len()),
        error: None,
    }
}

async fn decode(path: PathBuf) -> Result<Decoded, String> {
    let joined = tokio::task::spawn_blocking(move || -> Result<Decoded, String> {
        let reader = image::ImageReader::open(&path)
            .map_err(|e| e.to_string())?
            .with_guessed_format()
            .map_err(|e| e.to_string())?;
        let format = reader.format().map(format_name);
        let img = reader.decode().map_err(|e| e.to_string())?;
        Ok(Decoded {
            dimensions: Dimensions {
                width: img.width(),
                height: img.height(),
            },
            format,
        })
    })
    .await;

    joined.map_err(|e| e.to_string())?
}

fn format_name(format: image::ImageFormat) -> String {
    match format {
        image::ImageFormat::Png => "png".to_string(),
        image::ImageFormat::Jpeg => "jpeg".to_string(),
        image::ImageFormat::Gif => "gif".to_string(),
        image::ImageFormat::WebP => "webp".to_string(),
        image::ImageFormat::Bmp => "bmp".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}
