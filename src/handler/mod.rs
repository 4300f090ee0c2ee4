//! Request handler module
//!
//! Method checks, the health endpoint, route dispatch and the
//! resize pipeline behind each image route.

pub mod resize;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
