//! On-disk layouts produced by the lifecycle hooks.

use super::error::{RecipeError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Local alias the extracted release directory is renamed to.
pub const SOURCE_ALIAS: &str = "source_subfolder";

/// Header subtree inside both the source and the package.
pub const INCLUDE_DIR: &str = "include";

/// License subtree inside the package.
pub const LICENSES_DIR: &str = "licenses";

/// Extracted upstream tree.
///
/// Lives inside a scratch workspace that is deleted when the layout is
/// dropped, whatever the outcome of the run.
#[derive(Debug)]
pub struct SourceLayout {
    root: PathBuf,
    _workspace: Option<TempDir>,
}

impl SourceLayout {
    /// Layout owning its scratch workspace.
    pub fn scoped(workspace: TempDir, root: PathBuf) -> Self {
        Self {
            root,
            _workspace: Some(workspace),
        }
    }

    /// Layout over a directory the caller owns and cleans up.
    pub fn borrowed(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _workspace: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join(INCLUDE_DIR)
    }
}

/// Result of the package hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLayout {
    pub root: PathBuf,
    /// Copied headers, relative to `include/`.
    pub headers: Vec<PathBuf>,
    /// Copied license file, relative to the package root.
    pub license: PathBuf,
}

impl PackageLayout {
    /// Every packaged file relative to the package root.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .headers
            .iter()
            .map(|h| Path::new(INCLUDE_DIR).join(h))
            .collect();
        files.push(self.license.clone());
        files.sort();
        files
    }
}

/// Check that a packaged tree is usable by a consumer: a license is present
/// and every required header exists under `include/`.
pub fn verify_layout(root: &Path, required_headers: &[String]) -> Result<()> {
    let licenses = root.join(LICENSES_DIR);
    let has_license = std::fs::read_dir(&licenses)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.path().is_file())
        })
        .unwrap_or(false);
    if !has_license {
        return Err(RecipeError::missing("license file", licenses));
    }

    let include = root.join(INCLUDE_DIR);
    for header in required_headers {
        let path = include.join(header);
        if !path.is_file() {
            return Err(RecipeError::missing("header", path));
        }
    }

    Ok(())
}
