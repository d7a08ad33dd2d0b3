//! Recursive discovery of `.gz` files under the unzip input root.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Returns every regular file under `root` (recursively) whose name ends in `.gz`,
/// sorted. Unreadable entries are logged and skipped.
pub fn find_gz_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("error accessing {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(".gz") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}
