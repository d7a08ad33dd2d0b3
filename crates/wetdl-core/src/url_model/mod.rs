//! Object key modeling: source URL and local destination derivation.
//!
//! A key's destination is its final path segment, unchanged, placed directly
//! under the output root. Directory structure is not mirrored, so keys
//! that share a final segment share a destination.

mod filename;
mod path;

pub use filename::{linux_file_name, NAME_MAX};
pub use path::final_segment;

use std::path::{Path, PathBuf};

/// Derives the local file name for `key`, or `None` if the key has no usable final segment.
///
/// # Examples
///
/// - `destination_name("p/q/file1.gz")` → `Some("file1.gz")`
/// - `destination_name("p/.hidden.gz")` → `Some(".hidden.gz")`
/// - `destination_name("p/q/..")` → `None`
pub fn destination_name(key: &str) -> Option<String> {
    linux_file_name(final_segment(key)?).map(str::to_string)
}

/// Full destination path for `key` under `output_root`.
pub fn destination_path(output_root: &Path, key: &str) -> Option<PathBuf> {
    destination_name(key).map(|name| output_root.join(name))
}

/// Resolves `key` against `base` (which must end with `/`). Leading slashes on the
/// key are dropped so it stays under the base path.
pub fn source_url(base: &url::Url, key: &str) -> Result<url::Url, url::ParseError> {
    base.join(key.trim_start_matches('/'))
}
