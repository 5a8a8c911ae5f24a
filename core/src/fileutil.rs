//! File Utility Functions

use std::path::{Path, PathBuf};

/// Returns the absolute path after resolving the given path.
///
/// * `path` - The path.
pub fn absolute_path(path: &str) -> Result<String, String> {
    match PathBuf::from(path)
        .canonicalize()
        .map(PathBuf::into_os_string)
        .map(|s| s.into_string().ok())
    {
        Ok(Some(abs_path)) => Ok(abs_path),
        Ok(None) => Err(format!("invalid path {}", path)),
        Err(err) => Err(format!("invalid path {}. {}.", path, err)),
    }
}

/// Returns the file name without its extension, or an empty string.
///
/// * `path` - The path.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Returns the directory containing the path, or "." for a bare file name.
///
/// * `path` - The path.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
