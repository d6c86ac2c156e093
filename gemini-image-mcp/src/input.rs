//! Image reference resolution.
//!
//! A caller-supplied `{data, mimeType?}` is first classified into an
//! [`ImageReference`], then resolved into raw bytes plus a MIME type. Every
//! path through resolution ends with the magic-byte check from
//! [`crate::format`], so nothing unrecognisable reaches the remote model.

use crate::format::{self, ImageFormat};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Base64-alphabet strings at least this long are always treated as inline
/// payloads. Shorter ones must decode to a recognised image first.
const MIN_BARE_BASE64_LEN: usize = 64;

/// Standard alphabet, padding optional on decode.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^data:([\w.+-]+/[\w.+-]+);base64,(.*)$").expect("data URL pattern is valid")
});

/// Image entry as it appears in tool arguments.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImageInput {
    /// File path, base64 payload, or `data:<mime>;base64,<payload>` URL
    pub data: String,
    /// MIME type of an inline base64 payload
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// A classified image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    FilePath(PathBuf),
    InlineBase64 {
        data: String,
        mime_type: Option<String>,
    },
    DataUrl(String),
}

/// Raw image bytes ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Why a reference could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Image file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied reading image file: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read image file {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unrecognized image format: {0}")]
    UnrecognizedFormat(String),

    #[error("Malformed data URL: expected data:<mime>;base64,<payload>")]
    MalformedDataUrl,

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Image data is empty")]
    EmptyImageData,
}

impl ImageReference {
    /// Classify a tool input.
    ///
    /// Only `data` decides the kind: a `data:` prefix, then an inline base64
    /// payload, otherwise a filesystem path. A declared MIME type applies to
    /// inline payloads and is ignored for paths.
    pub fn from_input(input: &ImageInput) -> Self {
        let data = input.data.trim();

        if data.starts_with("data:") {
            ImageReference::DataUrl(data.to_string())
        } else if looks_like_base64(data) {
            ImageReference::InlineBase64 {
                data: data.to_string(),
                mime_type: input
                    .mime_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            }
        } else {
            ImageReference::FilePath(PathBuf::from(data))
        }
    }

    /// Resolve into bytes and a MIME type.
    pub async fn resolve(&self) -> Result<ResolvedImage, ResolveError> {
        match self {
            ImageReference::FilePath(path) => resolve_file(path).await,
            ImageReference::DataUrl(url) => resolve_data_url(url),
            ImageReference::InlineBase64 { data, mime_type } => {
                let bytes = decode_payload(data)?;
                let format = sniff(&bytes, "inline base64 payload")?;
                Ok(ResolvedImage {
                    bytes,
                    mime_type: mime_type
                        .clone()
                        .unwrap_or_else(|| format.mime_type().to_string()),
                })
            }
        }
    }
}

/// Short alphabet-only strings (`photos/cat`) count as base64 only when
/// they decode to a recognised image.
fn looks_like_base64(data: &str) -> bool {
    let in_alphabet = !data.is_empty()
        && data
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=') || b.is_ascii_whitespace());
    if !in_alphabet {
        return false;
    }
    data.len() >= MIN_BARE_BASE64_LEN
        || decode_payload(data)
            .ok()
            .and_then(|bytes| format::classify(&bytes))
            .is_some()
}

async fn resolve_file(path: &Path) -> Result<ResolvedImage, ResolveError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| io_to_resolve_error(path, e))?;
    if metadata.is_dir() {
        return Err(ResolveError::ReadError {
            path: path.to_path_buf(),
            source: io::Error::other("path is a directory"),
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| io_to_resolve_error(path, e))?;
    sniff(&bytes, &path.display().to_string())?;

    let mime_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Png)
        .mime_type()
        .to_string();

    debug!(path = %path.display(), size = bytes.len(), mime_type = %mime_type, "Resolved image file");
    Ok(ResolvedImage { bytes, mime_type })
}

fn resolve_data_url(url: &str) -> Result<ResolvedImage, ResolveError> {
    let captures = DATA_URL
        .captures(url)
        .ok_or(ResolveError::MalformedDataUrl)?;
    let mime_type = captures[1].to_string();
    let bytes = decode_payload(&captures[2])?;
    sniff(&bytes, "data URL payload")?;
    Ok(ResolvedImage { bytes, mime_type })
}

/// Decode base64, tolerating embedded whitespace and missing padding.
fn decode_payload(data: &str) -> Result<Vec<u8>, ResolveError> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ResolveError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ResolveError::EmptyImageData);
    }
    Ok(bytes)
}

fn sniff(bytes: &[u8], source: &str) -> Result<ImageFormat, ResolveError> {
    format::classify(bytes).ok_or_else(|| {
        ResolveError::UnrecognizedFormat(format!(
            "{} ({} bytes) is not PNG, JPEG, GIF, WebP or BMP",
            source,
            bytes.len()
        ))
    })
}

fn io_to_resolve_error(path: &Path, err: io::Error) -> ResolveError {
    match err.kind() {
        io::ErrorKind::NotFound => ResolveError::NotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => ResolveError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ResolveError::ReadError {
            path: path.to_path_buf(),
            source: err,
        },
    }
}
