use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::error::ImageError;
use super::format::{OutputFormat, LOSSY_QUALITY};

/// Encode an image in the given output format
pub fn encode_image(img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, ImageError> {
    let quality = format.quality().unwrap_or(LOSSY_QUALITY);
    let encode_err = |reason: String| ImageError::Encode {
        format: format.name(),
        reason,
    };

    match format {
        OutputFormat::Jpeg => {
            let mut buf = Cursor::new(Vec::new());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            // JPEG has no alpha channel
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| encode_err(e.to_string()))?;
            Ok(buf.into_inner())
        }
        OutputFormat::Png => {
            let mut buf = Cursor::new(Vec::new());
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| encode_err(e.to_string()))?;
            Ok(buf.into_inner())
        }
        OutputFormat::WebP => {
            // image's own WebP encoder is lossless only; libwebp gives us the lossy quality setting
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            if width == 0 || height == 0 {
                return Err(encode_err("empty image".to_string()));
            }
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                .encode_simple(false, f32::from(quality))
                .map_err(|e| encode_err(format!("{e:?}")))?;
            Ok(encoded.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 8, Rgba([200, 40, 10, 255])))
    }

    #[test]
    fn test_encode_jpeg() {
        let data = encode_image(&sample(), OutputFormat::Jpeg).unwrap();
        // JPEG SOI marker
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png() {
        let data = encode_image(&sample(), OutputFormat::Png).unwrap();
        assert_eq!(&data[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (12, 8));
    }

    #[test]
    fn test_encode_webp() {
        let data = encode_image(&sample(), OutputFormat::WebP).unwrap();
        // RIFF container with WEBP tag
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_webp_oversized_is_error() {
        // libwebp caps each side at 16383 pixels
        let wide = DynamicImage::new_rgb8(17_000, 1);
        assert!(matches!(
            encode_image(&wide, OutputFormat::WebP),
            Err(ImageError::Encode { format: "WebP", .. })
        ));
    }
}
