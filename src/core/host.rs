//! Host driver: runs a recipe's hooks in order for one destination.

use super::error::Result;
use super::identity::PackageIdentity;
use super::layout::{self, PackageLayout};
use super::lock;
use super::output;
use super::recipe::Recipe;
use super::settings::Settings;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub identity: PackageIdentity,
    pub source_url: String,
    pub destination: PathBuf,
    /// Packaged files relative to the destination.
    pub files: Vec<PathBuf>,
}

/// Options for [`run_recipe`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Headers that must exist after packaging; skipped when `None`.
    pub verify_headers: Option<Vec<String>>,
}

/// Run `acquire`, `package` and `identify` against `destination`.
///
/// Nothing is written under `destination` until acquisition succeeded. The
/// destination is locked for the packaging step so two runs into the same
/// directory cannot interleave.
pub fn run_recipe(
    recipe: &dyn Recipe,
    destination: &Path,
    settings: &Settings,
    options: &RunOptions,
) -> Result<RunReport> {
    let descriptor = recipe.descriptor();
    output::action(&format!("Packaging {}", descriptor.reference()));

    output::sub_action("acquire");
    let source = recipe.acquire()?;

    let guard = lock::lock_destination(destination)?;

    output::sub_action("package");
    let packaged: PackageLayout = recipe.package(&source, destination)?;
    drop(source);

    if let Some(headers) = &options.verify_headers {
        output::sub_action("verify");
        layout::verify_layout(destination, headers)?;
    }

    output::sub_action("identify");
    if !settings.is_empty() {
        output::detail(&format!("host settings {}", describe_settings(settings)));
    }
    let identity = recipe.identify(settings);
    output::detail(&format!("package id {}", identity.package_id));

    drop(guard);
    output::success(&format!("{} packaged into {}", identity, destination.display()));

    Ok(RunReport {
        source_url: descriptor.archive_url(),
        destination: destination.to_path_buf(),
        files: packaged.files(),
        identity,
    })
}

/// `key=value` pairs for every setting and option, options prefixed.
fn describe_settings(settings: &Settings) -> String {
    let values = settings.to_map().into_iter();
    let options = settings
        .options
        .iter()
        .map(|(k, v)| (format!("options.{k}"), v.clone()));
    values
        .chain(options)
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}
