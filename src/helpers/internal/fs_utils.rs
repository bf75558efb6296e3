//! Common filesystem utilities
//!
//! Shared copy and lookup operations used by the package hook.

use crate::core::error::{RecipeError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            RecipeError::io(format!("cannot create directory {}", parent.display()), e)
        })?;
    }
    Ok(())
}

/// Copy a file, creating parent directories as needed.
///
/// An existing destination file is overwritten.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest).map_err(|e| {
        RecipeError::io(
            format!("copy failed: {} -> {}", src.display(), dest.display()),
            e,
        )
    })
}

/// Recursively copy every file under `src` into `dest`, preserving relative
/// paths. Returns the copied paths relative to `src`, sorted.
///
/// Symlinks are followed so the destination only holds regular files.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let context = format!("cannot walk {}", src.display());
            match e.into_io_error() {
                Some(io) => RecipeError::io(context, io),
                None => RecipeError::io(
                    context,
                    std::io::Error::other("filesystem loop detected"),
                ),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                RecipeError::io(
                    format!("path outside source tree: {}", entry.path().display()),
                    std::io::Error::other("strip_prefix failed"),
                )
            })?
            .to_path_buf();

        copy_file(entry.path(), &dest.join(&rel))?;
        copied.push(rel);
    }

    Ok(copied)
}

/// Find a file directly inside `dir` whose name matches one of `candidates`
/// case-insensitively. Candidates are tried in order.
pub fn find_file_case_insensitive(dir: &Path, candidates: &[&str]) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| RecipeError::io(format!("cannot read {}", dir.display()), e))?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RecipeError::io(format!("cannot read {}", dir.display()), e))?;
        let path = entry.path();
        if path.is_file() {
            files.push((entry.file_name().to_string_lossy().to_lowercase(), path));
        }
    }
    // read_dir order is platform-defined
    files.sort();

    for candidate in candidates {
        let wanted = candidate.to_lowercase();
        if let Some((_, path)) = files.iter().find(|(name, _)| *name == wanted) {
            return Ok(Some(path.clone()));
        }
    }
    Ok(None)
}

/// Check if path is safe (no path traversal).
///
/// Rejects absolute paths and paths containing "..".
pub fn is_safe_path(path: &Path) -> bool {
    !path.is_absolute()
        && !path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
}
