//! Image pipeline module
//!
//! Everything between "a path and a query string" and "encoded bytes":
//! source lookup, dimension parsing, decoding, resizing and encoding.

pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod error;
pub mod format;
pub mod resize;
pub mod resolve;

pub use decode::decode_image;
pub use dimensions::{parse_dimensions, DimensionRequest};
pub use encode::encode_image;
pub use error::{DimensionError, ImageError, ResolveError};
pub use format::OutputFormat;
pub use resize::resize_image;
pub use resolve::resolve_image_path;
