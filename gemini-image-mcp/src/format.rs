//! Magic-byte image format sniffing.
//!
//! `classify` answers "does this look like a container of format X" from a
//! static signature table. It never parses chunks; full decoding happens in
//! the validation tool.

use serde::Serialize;
use std::fmt;

/// Buffers shorter than this are never classified.
pub const MIN_SNIFF_LEN: usize = 4;

/// Image formats accepted as references and produced as outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// Map a reference path's extension to a format.
    ///
    /// Only the four extensions agents commonly send are recognised here;
    /// callers default anything else to PNG.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        };
        f.write_str(name)
    }
}

/// One row of the signature table.
struct Signature {
    format: ImageFormat,
    /// Every `(offset, bytes)` marker must match.
    markers: &'static [(usize, &'static [u8])],
    /// Smallest buffer that can hold the format's fixed header.
    min_len: usize,
}

// PNG needs signature + IHDR (8 + 25), GIF header + screen descriptor (6 + 7),
// BMP file header + smallest DIB header (14 + 12), WebP RIFF header + first
// chunk header (12 + 8).
const SIGNATURES: &[Signature] = &[
    Signature {
        format: ImageFormat::Png,
        markers: &[(0, &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])],
        min_len: 33,
    },
    Signature {
        format: ImageFormat::Jpeg,
        markers: &[(0, &[0xFF, 0xD8, 0xFF])],
        min_len: 4,
    },
    Signature {
        format: ImageFormat::Gif,
        markers: &[(0, b"GIF87a")],
        min_len: 13,
    },
    Signature {
        format: ImageFormat::Gif,
        markers: &[(0, b"GIF89a")],
        min_len: 13,
    },
    Signature {
        format: ImageFormat::WebP,
        markers: &[(0, b"RIFF"), (8, b"WEBP")],
        min_len: 20,
    },
    Signature {
        format: ImageFormat::Bmp,
        markers: &[(0, b"BM")],
        min_len: 26,
    },
];

impl Signature {
    fn matches(&self, bytes: &[u8]) -> bool {
        bytes.len() >= self.min_len
            && self
                .markers
                .iter()
                .all(|(offset, expected)| bytes.get(*offset..offset + expected.len()) == Some(*expected))
    }
}

/// Classify a buffer by its leading bytes.
///
/// Returns `None` for buffers shorter than [`MIN_SNIFF_LEN`], buffers too
/// short to hold the matched format's header, and unknown signatures.
pub fn classify(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() < MIN_SNIFF_LEN {
        return None;
    }
    SIGNATURES
        .iter()
        .find(|sig| sig.matches(bytes))
        .map(|sig| sig.format)
}
