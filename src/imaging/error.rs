//! Error types for the image pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Source file lookup failure
///
/// Both variants are reported to clients identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no source image found")]
    NotFound,

    #[error("path escapes the route directory")]
    InvalidPath,
}

/// Malformed or out-of-range dimension request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("invalid {name} '{value}': expected a non-negative integer")]
    Invalid { name: &'static str, value: String },

    #[error("{name} {value} exceeds the maximum of {max}")]
    TooLarge {
        name: &'static str,
        value: u32,
        max: u32,
    },
}

/// Decode and encode failures
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("{format} encode failed: {reason}")]
    Encode {
        format: &'static str,
        reason: String,
    },
}
