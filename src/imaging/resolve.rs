//! Source path resolution
//!
//! Maps a request stem onto an existing file inside a route directory.
//! The extension is appended after the untrusted stem, so containment is
//! checked on every candidate rather than once on the raw input.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use super::error::ResolveError;

/// Source extensions in lookup order; the first existing file wins
pub const SOURCE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Make a path absolute and resolve `.`/`..` lexically, without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Find the source image for `stem` below `base_dir`
///
/// Candidates that normalise outside the base directory are skipped.
/// When nothing is found, `InvalidPath` is returned if any candidate
/// escaped and `NotFound` otherwise.
pub async fn resolve_image_path(base_dir: &Path, stem: &str) -> Result<PathBuf, ResolveError> {
    let base = normalize_path(base_dir);
    let relative = stem.trim_start_matches('/');
    let mut escaped = false;

    for ext in SOURCE_EXTENSIONS {
        let candidate = normalize_path(&base.join(format!("{relative}{ext}")));
        if !candidate.starts_with(&base) {
            escaped = true;
            continue;
        }
        if fs::metadata(&candidate)
            .await
            .is_ok_and(|meta| meta.is_file())
        {
            return Ok(candidate);
        }
    }

    if escaped {
        Err(ResolveError::InvalidPath)
    } else {
        Err(ResolveError::NotFound)
    }
}
