//! HTTP protocol layer module
//!
//! Response builders shared by the health check and image routes.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_500_response,
    build_health_response, build_image_response,
};
