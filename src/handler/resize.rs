//! Image route handler
//!
//! Runs one request through the pipeline:
//! prefix strip → dimensions → source lookup → decode → resize → encode.
//! The output format is checked at the encode step, after a successful decode.
//! Decoding, resizing and encoding are CPU bound and run on the blocking pool.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http;
use crate::imaging::{
    decode_image, encode_image, parse_dimensions, resize_image, resolve_image_path,
    DimensionError, DimensionRequest, ImageError, OutputFormat, ResolveError,
};
use crate::logger;
use crate::routing::Route;

/// Everything that can end an image request early
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Dimension(_) | Self::Image(ImageError::UnsupportedFormat(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Resolve(_) => StatusCode::NOT_FOUND,
            Self::Image(ImageError::Decode { .. } | ImageError::Encode { .. })
            | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log server-side details and build the client response
    fn into_response(self, request_path: &str) -> Response<Full<Bytes>> {
        match &self {
            Self::Resolve(ResolveError::InvalidPath) => {
                logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
            }
            Self::Image(ImageError::Decode { .. }) => {
                logger::log_error(&format!("Error decoding image: {self}"));
            }
            Self::Image(ImageError::Encode { .. }) | Self::Worker(_) => {
                logger::log_error(&format!("{request_path}: {self}"));
            }
            _ => {}
        }

        match self.status() {
            StatusCode::BAD_REQUEST => http::build_400_response(&self.to_string()),
            StatusCode::NOT_FOUND => http::build_404_response(),
            _ if matches!(self, Self::Image(ImageError::Decode { .. })) => {
                http::build_500_response("Failed to decode image")
            }
            _ => http::build_500_response("Failed to process image"),
        }
    }
}

/// Encoded output ready to send
#[derive(Debug)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
}

/// Serve one request for an image route
pub async fn serve_image(
    ctx: &RequestContext<'_>,
    route: &Route,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match process(ctx, route, state.config.images.max_dimension).await {
        Ok(encoded) => {
            http::build_image_response(encoded.data, encoded.format.content_type(), ctx.is_head)
        }
        Err(err) => err.into_response(ctx.path),
    }
}

async fn process(
    ctx: &RequestContext<'_>,
    route: &Route,
    max_dimension: u32,
) -> Result<EncodedImage, ServeError> {
    let relative = route.strip(ctx.path);
    let (stem, ext) = split_extension(relative);

    let dims = parse_dimensions(ctx.query)?;
    dims.validate(max_dimension)?;

    let source = resolve_image_path(&route.base_dir, stem).await?;
    let ext = ext.to_string();

    tokio::task::spawn_blocking(move || transform(&source, dims, &ext, max_dimension)).await?
}

/// Decode, optionally resize, and encode into the format named by `ext`
fn transform(
    source: &Path,
    dims: DimensionRequest,
    ext: &str,
    max_dimension: u32,
) -> Result<EncodedImage, ServeError> {
    let img = decode_image(source)?;
    let img = if dims.is_empty() {
        img
    } else {
        let (width, height) = dims.as_pair();
        resize_image(&img, width, height, max_dimension)?
    };
    let format = OutputFormat::from_extension(ext)?;
    let data = encode_image(&img, format)?;
    Ok(EncodedImage { data, format })
}

/// Split `dir/name.ext` into (`dir/name`, `ext`); the dot must be in the last segment
pub fn split_extension(path: &str) -> (&str, &str) {
    match path.rfind(['.', '/']) {
        Some(idx) if path.as_bytes()[idx] == b'.' => (&path[..idx], &path[idx + 1..]),
        _ => (path, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RouteConfig};
    use crate::handler::router::dispatch;
    use http_body_util::BodyExt;
    use hyper::Method;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
        state: AppState,
    }

    /// Route `/photos/` onto `<tmp>/photos`, with `photo.png` (64x32) inside
    fn fixture() -> Fixture {
        let root = TempDir::new().unwrap();
        let photos = root.path().join("photos");
        fs::create_dir(&photos).unwrap();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([10, 120, 200])))
            .save_with_format(photos.join("photo.png"), ImageFormat::Png)
            .unwrap();

        let state = AppState::new(&Config::for_tests(vec![RouteConfig {
            route: "/photos/".to_string(),
            dir: photos.to_string_lossy().into_owned(),
        }]));
        Fixture { root, state }
    }

    async fn get(state: &AppState, path: &str, query: Option<&str>) -> Response<Full<Bytes>> {
        dispatch(&Method::GET, path, query, state).await
    }

    async fn body(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a/b.jpg"), ("a/b", "jpg"));
        assert_eq!(split_extension("photo.tar.gz"), ("photo.tar", "gz"));
        assert_eq!(split_extension("dir.v2/photo"), ("dir.v2/photo", ""));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[tokio::test]
    async fn test_resize_and_convert_png_to_jpeg() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.jpg", Some("200x100")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "image/jpeg");

        let img = image::load_from_memory(&body(resp).await).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn test_original_size_reencoded() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.webp", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "image/webp");

        let data = body(resp).await;
        assert_eq!(&data[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_width_only_keeps_aspect() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.png", Some("width=32")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let img = image::load_from_memory(&body(resp).await).unwrap();
        assert_eq!(img.dimensions(), (32, 16));
    }

    #[tokio::test]
    async fn test_compact_height_only() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.PNG", Some("x8")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let img = image::load_from_memory(&body(resp).await).unwrap();
        assert_eq!(img.dimensions(), (16, 8));
    }

    #[tokio::test]
    async fn test_malformed_dimensions_is_400() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.jpg", Some("bigx100")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let text = body(resp).await;
        assert!(String::from_utf8_lossy(&text).contains("big"));
    }

    #[tokio::test]
    async fn test_dimension_above_limit_is_400() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.jpg", Some("100000x10")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_output_format_is_400() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/photo.gif", Some("10x10")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.headers()["Content-Type"]
            .to_str()
            .unwrap()
            .starts_with("image/"));
    }

    #[tokio::test]
    async fn test_derived_side_above_limit_is_400() {
        let fx = fixture();
        DynamicImage::new_rgb8(400, 2)
            .save_with_format(fx.root.path().join("photos/strip.png"), ImageFormat::Png)
            .unwrap();

        // Height 100 is allowed, but the derived width would be 20000
        let resp = get(&fx.state, "/photos/strip.png", Some("x100")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let text = body(resp).await;
        assert!(String::from_utf8_lossy(&text).contains("20000"));
    }

    #[tokio::test]
    async fn test_corrupt_source_with_unsupported_format_is_500() {
        let fx = fixture();
        fs::write(fx.root.path().join("photos/broken.jpg"), b"garbage").unwrap();

        let resp = get(&fx.state, "/photos/broken.gif", None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_source_is_404() {
        let fx = fixture();
        let resp = get(&fx.state, "/photos/nothing.jpg", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_404_even_if_target_exists() {
        let fx = fixture();
        DynamicImage::new_rgb8(4, 4)
            .save_with_format(fx.root.path().join("passwd.jpg"), ImageFormat::Jpeg)
            .unwrap();

        for path in [
            "/photos/../passwd.jpg",
            "/photos/../../etc/passwd.jpg",
            "/photos/%2e%2e/passwd.jpg",
        ] {
            let resp = get(&fx.state, path, None).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_source_is_500() {
        let fx = fixture();
        fs::write(fx.root.path().join("photos/broken.jpg"), b"garbage").unwrap();

        let resp = get(&fx.state, "/photos/broken.png", None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_head_has_headers_without_body() {
        let fx = fixture();
        let resp = dispatch(&Method::HEAD, "/photos/photo.png", None, &fx.state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "image/png");
        assert!(body(resp).await.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServeError::from(ResolveError::InvalidPath).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServeError::from(ImageError::UnsupportedFormat("gif".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServeError::from(ImageError::Decode {
                path: "x.jpg".into(),
                reason: "bad".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
