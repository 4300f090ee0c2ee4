//! Output format table
//!
//! The output format comes from the request extension only; a `.png`
//! source can be served as `.jpg` or `.webp`.

use super::error::ImageError;

/// Quality used by the lossy encoders
pub const LOSSY_QUALITY: u8 = 85;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

/// Extension → format mapping
const EXTENSIONS: &[(&str, OutputFormat)] = &[
    ("jpg", OutputFormat::Jpeg),
    ("jpeg", OutputFormat::Jpeg),
    ("png", OutputFormat::Png),
    ("webp", OutputFormat::WebP),
];

impl OutputFormat {
    /// Look up a request extension, case-insensitive, with or without the leading dot
    pub fn from_extension(ext: &str) -> Result<Self, ImageError> {
        let normalized = ext.trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
            .map(|(_, format)| *format)
            .ok_or(ImageError::UnsupportedFormat(normalized))
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Encoder quality, `None` for lossless formats
    pub const fn quality(self) -> Option<u8> {
        match self {
            Self::Jpeg | Self::WebP => Some(LOSSY_QUALITY),
            Self::Png => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
        }
    }
}
