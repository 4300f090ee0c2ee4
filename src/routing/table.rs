//! Route table module
//!
//! Maps a request path to the image route that owns it.

use std::path::PathBuf;

use crate::config::RouteConfig;

/// A URL prefix bound to a directory of source images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub base_dir: PathBuf,
}

impl Route {
    pub fn new(prefix: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Check whether this route owns the given path
    ///
    /// A prefix ending in `/` owns its whole subtree. Otherwise the match
    /// must stop at a segment boundary, so `/img` owns `/img/a.jpg`
    /// but not `/images/a.jpg`.
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        self.prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/')
    }

    /// Path relative to the route directory, without the route prefix
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }
}

/// Immutable route table, built once at startup
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table; longer prefixes are tried first
    pub fn new(mut routes: Vec<Route>) -> Self {
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    pub fn from_config(routes: &[RouteConfig]) -> Self {
        Self::new(
            routes
                .iter()
                .map(|r| Route::new(r.route.clone(), r.dir.clone()))
                .collect(),
        )
    }

    /// Find the route that owns a request path
    pub fn match_route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
