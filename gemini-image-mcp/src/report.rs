//! Tool result objects and the error-code taxonomy.
//!
//! Typed failures map straight to a code. Opaque messages (remote API bodies,
//! stray I/O errors) go through [`classify_message`], whose pattern order is
//! significant: the first matching row wins.

use crate::content::AssembleError;
use crate::handler::{GeneratedImage, GenerationError};
use crate::input::ResolveError;
use crate::output::OutputError;
use gemini_image_mcp_common::error::Error;
use serde::Serialize;
use serde_json::{Value, json};

/// Stable error codes returned to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidApiKey,
    QuotaExceeded,
    ApiError,
    InvalidInput,
    FileExists,
    FileNotFound,
    FileAccessError,
    FileWriteError,
    InvalidImageFormat,
    InvalidBase64,
    EmptyImageData,
    NoImagesGenerated,
    UnknownError,
}

impl ErrorCode {
    /// Every code, in taxonomy order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::InvalidApiKey,
        ErrorCode::QuotaExceeded,
        ErrorCode::ApiError,
        ErrorCode::InvalidInput,
        ErrorCode::FileExists,
        ErrorCode::FileNotFound,
        ErrorCode::FileAccessError,
        ErrorCode::FileWriteError,
        ErrorCode::InvalidImageFormat,
        ErrorCode::InvalidBase64,
        ErrorCode::EmptyImageData,
        ErrorCode::NoImagesGenerated,
        ErrorCode::UnknownError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidApiKey => "INVALID_API_KEY",
            ErrorCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::FileExists => "FILE_EXISTS",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::FileAccessError => "FILE_ACCESS_ERROR",
            ErrorCode::FileWriteError => "FILE_WRITE_ERROR",
            ErrorCode::InvalidImageFormat => "INVALID_IMAGE_FORMAT",
            ErrorCode::InvalidBase64 => "INVALID_BASE64",
            ErrorCode::EmptyImageData => "EMPTY_IMAGE_DATA",
            ErrorCode::NoImagesGenerated => "NO_IMAGES_GENERATED",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidApiKey => "The API key was rejected by the remote service",
            ErrorCode::QuotaExceeded => "Rate limit or quota exhausted on the remote service",
            ErrorCode::ApiError => "The remote service failed for an unclassified reason",
            ErrorCode::InvalidInput => "Request arguments are malformed or out of range",
            ErrorCode::FileExists => "An output path already exists; nothing was overwritten",
            ErrorCode::FileNotFound => "A referenced input file does not exist",
            ErrorCode::FileAccessError => "A file could not be accessed (permissions or I/O)",
            ErrorCode::FileWriteError => "An output file could not be written",
            ErrorCode::InvalidImageFormat => "Bytes are not a recognised PNG, JPEG, GIF, WebP or BMP image",
            ErrorCode::InvalidBase64 => "Inline image data is not valid base64",
            ErrorCode::EmptyImageData => "Inline image data decoded to zero bytes",
            ErrorCode::NoImagesGenerated => "The model returned no usable images for the whole batch",
            ErrorCode::UnknownError => "An error that matched no known pattern",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{code, message, details?}` as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Terminal result of one `generate_image` call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub images: Vec<GeneratedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl GenerationResult {
    pub fn success(images: Vec<GeneratedImage>) -> Self {
        Self {
            success: true,
            images,
            error: None,
        }
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            success: false,
            images: Vec::new(),
            error: Some(error),
        }
    }

    pub fn from_outcome(outcome: Result<Vec<GeneratedImage>, GenerationError>) -> Self {
        match outcome {
            Ok(images) => Self::success(images),
            Err(err) => Self::failure(report_error(&err)),
        }
    }
}

// Earlier rows take precedence over later ones.
const MESSAGE_PATTERNS: &[(ErrorCode, &[&str])] = &[
    (
        ErrorCode::InvalidApiKey,
        &["api key", "api_key", "apikey", "unauthenticated", "invalid credentials"],
    ),
    (
        ErrorCode::FileExists,
        &["already exists", "file exists"],
    ),
    (
        ErrorCode::QuotaExceeded,
        &["quota", "rate limit", "resource_exhausted", "resource has been exhausted", "too many requests"],
    ),
    (
        ErrorCode::FileAccessError,
        &["permission", "access denied", "eacces", "eperm"],
    ),
    (
        ErrorCode::FileNotFound,
        &["not found", "no such file", "enoent", "does not exist"],
    ),
    (
        ErrorCode::InvalidImageFormat,
        &["unrecognized image format", "unsupported image format", "invalid image format"],
    ),
    (ErrorCode::InvalidBase64, &["base64"]),
    (ErrorCode::EmptyImageData, &["empty"]),
    (ErrorCode::FileWriteError, &["failed to write", "write error", "could not write"]),
    (ErrorCode::ApiError, &["api error", "generatecontent", "request failed"]),
];

/// Classify an opaque error message. Matching is case-insensitive.
pub fn classify_message(message: &str) -> ErrorCode {
    let lowered = message.to_lowercase();
    MESSAGE_PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(code, _)| *code)
        .unwrap_or(ErrorCode::UnknownError)
}

/// Code for a remote or common-library error.
pub fn classify_api_error(err: &Error) -> ErrorCode {
    match err {
        Error::Api {
            status_code,
            message,
            ..
        } => match status_code {
            401 | 403 => ErrorCode::InvalidApiKey,
            429 => ErrorCode::QuotaExceeded,
            _ => match classify_message(message) {
                ErrorCode::UnknownError => ErrorCode::ApiError,
                code => code,
            },
        },
        Error::Validation(_) => ErrorCode::InvalidInput,
        other => classify_message(&other.to_string()),
    }
}

pub fn classify_resolve_error(err: &ResolveError) -> ErrorCode {
    match err {
        ResolveError::NotFound { .. } => ErrorCode::FileNotFound,
        ResolveError::PermissionDenied { .. } | ResolveError::ReadError { .. } => {
            ErrorCode::FileAccessError
        }
        ResolveError::UnrecognizedFormat(_) => ErrorCode::InvalidImageFormat,
        ResolveError::MalformedDataUrl => ErrorCode::InvalidInput,
        ResolveError::InvalidBase64(_) => ErrorCode::InvalidBase64,
        ResolveError::EmptyImageData => ErrorCode::EmptyImageData,
    }
}

pub fn classify_output_error(err: &OutputError) -> ErrorCode {
    match err {
        OutputError::FileExists { .. } => ErrorCode::FileExists,
        OutputError::Access { .. } => ErrorCode::FileAccessError,
        OutputError::Write { .. } => ErrorCode::FileWriteError,
    }
}

/// Code for any orchestrator failure.
pub fn classify_error(err: &GenerationError) -> ErrorCode {
    match err {
        GenerationError::InvalidInput { .. } => ErrorCode::InvalidInput,
        GenerationError::Assemble(AssembleError::NoContent) => ErrorCode::InvalidInput,
        GenerationError::Assemble(AssembleError::Resolve(e)) => classify_resolve_error(e),
        GenerationError::InvalidImageData(e) => classify_resolve_error(e),
        GenerationError::Output(e) => classify_output_error(e),
        GenerationError::Api(e) => classify_api_error(e),
        GenerationError::Metadata { .. } => ErrorCode::InvalidImageFormat,
        GenerationError::NoImagesGenerated { .. } => ErrorCode::NoImagesGenerated,
    }
}

/// Build the caller-facing error object, with details where they help.
pub fn report_error(err: &GenerationError) -> ErrorInfo {
    let details = match err {
        GenerationError::InvalidInput { errors, .. } => Some(json!({ "errors": errors })),
        GenerationError::Output(OutputError::FileExists { path }) => {
            Some(json!({ "path": path.display().to_string() }))
        }
        GenerationError::Api(Error::Api { status_code, .. }) => {
            Some(json!({ "statusCode": status_code }))
        }
        GenerationError::NoImagesGenerated { attempted } => {
            Some(json!({ "attempted": attempted }))
        }
        _ => None,
    };

    ErrorInfo {
        code: classify_error(err),
        message: err.to_string(),
        details,
    }
}
