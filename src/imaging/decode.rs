use std::path::Path;

use image::{DynamicImage, ImageReader};

use super::error::ImageError;

/// Decode an image file
///
/// The format is sniffed from the file contents, so a mislabelled
/// extension still decodes.
pub fn decode_image(path: &Path) -> Result<DynamicImage, ImageError> {
    let decode_err = |reason: String| ImageError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}
