//! Image resizing with a fixed Lanczos3 filter

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use super::error::DimensionError;

/// Compute the output size; a zero side is derived from the source aspect ratio
///
/// Derived sides are rounded and never smaller than one pixel.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn target_dimensions(src_w: u32, src_h: u32, width: u32, height: u32) -> (u32, u32) {
    match (width, height) {
        (0, 0) => (src_w, src_h),
        (0, h) => {
            let w = (f64::from(src_w) * f64::from(h) / f64::from(src_h)).round();
            ((w as u32).max(1), h)
        }
        (w, 0) => {
            let h = (f64::from(src_h) * f64::from(w) / f64::from(src_w)).round();
            (w, (h as u32).max(1))
        }
        (w, h) => (w, h),
    }
}

/// Resize an image
///
/// With both sides non-zero the image is stretched to exactly `width x height`.
/// The output size, including a side derived from the aspect ratio, must not
/// exceed `max` on either side.
pub fn resize_image(
    img: &DynamicImage,
    width: u32,
    height: u32,
    max: u32,
) -> Result<DynamicImage, DimensionError> {
    let (src_w, src_h) = img.dimensions();
    if (width == 0 && height == 0) || src_w == 0 || src_h == 0 {
        return Ok(img.clone());
    }
    let (w, h) = target_dimensions(src_w, src_h, width, height);
    for (name, value) in [("width", w), ("height", h)] {
        if value > max {
            return Err(DimensionError::TooLarge { name, value, max });
        }
    }
    Ok(img.resize_exact(w, h, FilterType::Lanczos3))
}
