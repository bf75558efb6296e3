//! The recipe interface and the header-only implementation.
//!
//! A host drives a recipe through three hooks, always in this order:
//!
//! 1. [`Recipe::acquire`] downloads and unpacks the upstream release
//! 2. [`Recipe::package`] copies headers and license into the destination
//! 3. [`Recipe::identify`] computes the key the host caches the package under
//!
//! Hooks keep no state between calls; everything they need is passed in.

use super::descriptor::PackageDescriptor;
use super::error::{RecipeError, Result};
use super::identity::PackageIdentity;
use super::layout::{INCLUDE_DIR, LICENSES_DIR, PackageLayout, SOURCE_ALIAS, SourceLayout};
use super::output;
use super::settings::Settings;
use crate::helpers::extract;
use crate::helpers::fetch::{Fetcher, HttpFetcher};
use crate::helpers::internal::fs_utils;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// License file names, most preferred first. Matched case-insensitively.
pub const LICENSE_NAMES: &[&str] = &["license.txt", "license", "license.md", "copying"];

/// Lifecycle hooks a host tool calls for one package version.
pub trait Recipe {
    fn descriptor(&self) -> &PackageDescriptor;

    /// Fetch and unpack the upstream release.
    fn acquire(&self) -> Result<SourceLayout>;

    /// Copy the consumable artifacts from `source` into `destination`.
    fn package(&self, source: &SourceLayout, destination: &Path) -> Result<PackageLayout>;

    /// Package identity for the given host settings.
    fn identify(&self, settings: &Settings) -> PackageIdentity;
}

/// Recipe for a header-only library released as GitHub tag archives.
///
/// Its identity ignores every compiler, architecture and build-type setting.
pub struct HeaderOnlyRecipe<F: Fetcher = HttpFetcher> {
    descriptor: PackageDescriptor,
    fetcher: F,
    work_dir: Option<PathBuf>,
    declared_options: Vec<String>,
}

impl HeaderOnlyRecipe<HttpFetcher> {
    pub fn new(descriptor: PackageDescriptor) -> Self {
        Self::with_fetcher(descriptor, HttpFetcher::new())
    }
}

impl<F: Fetcher> HeaderOnlyRecipe<F> {
    pub fn with_fetcher(descriptor: PackageDescriptor, fetcher: F) -> Self {
        Self {
            descriptor,
            fetcher,
            work_dir: None,
            declared_options: Vec::new(),
        }
    }

    /// Create scratch workspaces under `dir` instead of the system temp dir.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Options that stay part of the identity. RapidJSON declares none.
    pub fn with_declared_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_options = options.into_iter().map(Into::into).collect();
        self
    }

    fn workspace(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".recipe-");
        let workspace = match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    RecipeError::io(format!("cannot create work dir {}", dir.display()), e)
                })?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        };
        workspace.map_err(|e| RecipeError::io("cannot create scratch workspace", e))
    }
}

impl<F: Fetcher> Recipe for HeaderOnlyRecipe<F> {
    fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    fn acquire(&self) -> Result<SourceLayout> {
        let d = &self.descriptor;
        d.validate()?;

        let url = d.archive_url();
        output::detail(&format!("Downloading sources from '{}'...", url));

        let workspace = self.workspace()?;
        let archive = workspace.path().join(format!("v{}.tar.gz", d.version));

        let bytes = self.fetcher.fetch(&url, &archive).map_err(|e| match e {
            RecipeError::NotFound { .. } => RecipeError::NotFound {
                reference: d.reference(),
                url: url.clone(),
            },
            other => other,
        })?;
        output::detail(&format!("downloaded {} bytes", bytes));

        let unpack_dir = workspace.path().join("unpack");
        extract::extract_tar_gz(&archive, &unpack_dir)?;

        let extracted = unpack_dir.join(d.extracted_dir_name());
        if !extracted.is_dir() {
            return Err(RecipeError::missing("extracted release directory", extracted));
        }

        let alias = workspace.path().join(SOURCE_ALIAS);
        if alias.exists() {
            return Err(RecipeError::io(
                format!("cannot rename to {}", alias.display()),
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
        std::fs::rename(&extracted, &alias).map_err(|e| {
            RecipeError::io(
                format!("cannot rename {} -> {}", extracted.display(), alias.display()),
                e,
            )
        })?;

        Ok(SourceLayout::scoped(workspace, alias))
    }

    fn package(&self, source: &SourceLayout, destination: &Path) -> Result<PackageLayout> {
        // Locate both assets before writing anything
        let include_src = source.include_dir();
        if !include_src.is_dir() {
            return Err(RecipeError::missing("include directory", include_src));
        }
        let license_src = fs_utils::find_file_case_insensitive(source.root(), LICENSE_NAMES)?
            .ok_or_else(|| {
                RecipeError::missing("license file", source.root().join(LICENSE_NAMES[0]))
            })?;
        let license_name = license_src
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| RecipeError::missing("license file name", license_src.clone()))?;

        let headers = fs_utils::copy_tree(&include_src, &destination.join(INCLUDE_DIR))?;
        output::detail(&format!("copied {} headers", headers.len()));

        let license = Path::new(LICENSES_DIR).join(&license_name);
        fs_utils::copy_file(&license_src, &destination.join(&license))?;
        output::detail(&format!("copied {}", license.display()));

        Ok(PackageLayout {
            root: destination.to_path_buf(),
            headers,
            license,
        })
    }

    fn identify(&self, settings: &Settings) -> PackageIdentity {
        // Header-only: no setting takes part in the identity
        let options: BTreeMap<String, String> = settings
            .options
            .iter()
            .filter(|(k, _)| self.declared_options.iter().any(|d| d == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        PackageIdentity::new(&self.descriptor, BTreeMap::new(), options)
    }
}
