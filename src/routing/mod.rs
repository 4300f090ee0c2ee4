//! Routing module
//!
//! Static route table mapping URL prefixes to image directories.

mod table;

pub use table::{Route, RouteTable};
