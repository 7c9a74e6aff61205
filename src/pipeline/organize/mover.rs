//! Filing the document: create the destination directory and move the file.
//!
//! Filing never loses the file: after the call it exists at exactly one
//! path — the destination when the move worked, the original otherwise.

use std::path::{Path, PathBuf};

use super::filename::sanitize_filename;

/// Move `original` into `target_dir` under `new_name` (sanitized).
/// Returns the path the file actually lives at afterwards.
pub fn move_rename_file(original: &Path, new_name: &str, target_dir: &Path) -> PathBuf {
    let sanitized = sanitize_filename(new_name);

    if let Err(e) = std::fs::create_dir_all(target_dir) {
        tracing::error!(
            dir = %target_dir.display(),
            error = %e,
            "failed to create destination directory, leaving file in place"
        );
        return original.to_path_buf();
    }

    let destination = target_dir.join(&sanitized);

    // Same-filesystem atomic rename first.
    if std::fs::rename(original, &destination).is_ok() {
        return destination;
    }

    // Cross-filesystem fallback: copy, then remove the source.
    match std::fs::copy(original, &destination) {
        Ok(_) => {
            if let Err(e) = std::fs::remove_file(original) {
                // Keep the invariant of exactly one path: drop the copy.
                tracing::error!(
                    src = %original.display(),
                    error = %e,
                    "copied but could not remove source, rolling back"
                );
                let _ = std::fs::remove_file(&destination);
                return original.to_path_buf();
            }
            destination
        }
        Err(e) => {
            tracing::error!(
                src = %original.display(),
                dst = %destination.display(),
                error = %e,
                "failed to move file, leaving it in place"
            );
            original.to_path_buf()
        }
    }
}
