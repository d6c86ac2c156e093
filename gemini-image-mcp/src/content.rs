//! Content assembly for a single generation call.
//!
//! Text-to-image, single-image editing and multi-image composition are the
//! same operation here: a text part when a prompt is given, followed by one
//! inline part per reference image, in caller order.

use crate::input::{ImageReference, ResolveError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// One ordered segment of the request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage {
        mime_type: String,
        /// Base64-encoded bytes
        data: String,
    },
}

/// Why assembly produced nothing to send.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("No content to send: provide a prompt or at least one image")]
    NoContent,
}

/// Build the content parts for one batch unit.
///
/// References are resolved on every call; the first resolution failure is
/// returned as-is.
pub async fn assemble(
    prompt: Option<&str>,
    images: &[ImageReference],
) -> Result<Vec<ContentPart>, AssembleError> {
    let mut parts = Vec::with_capacity(images.len() + 1);

    if let Some(text) = prompt.map(str::trim).filter(|p| !p.is_empty()) {
        parts.push(ContentPart::Text(text.to_string()));
    }

    for reference in images {
        let resolved = reference.resolve().await?;
        parts.push(ContentPart::InlineImage {
            mime_type: resolved.mime_type,
            data: STANDARD.encode(&resolved.bytes),
        });
    }

    if parts.is_empty() {
        return Err(AssembleError::NoContent);
    }

    tracing::debug!(
        parts = parts.len(),
        images = images.len(),
        "Assembled content"
    );
    Ok(parts)
}
