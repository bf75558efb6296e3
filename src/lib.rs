//! Header-only package recipe for RapidJSON
//!
//! Fetches a tagged RapidJSON release, repackages its headers and license
//! into a standard layout and declares a settings-independent identity.
//!
//! # Lifecycle
//!
//! A host drives a [`Recipe`] through three hooks in a fixed order:
//!
//! - `acquire()` - download `<repository>/archive/v<version>.tar.gz`, unpack
//!   it into a scratch workspace and rename `<name>-<version>` to a fixed alias
//! - `package(source, destination)` - copy `include/` recursively and the
//!   license file into `destination/include` and `destination/licenses`
//! - `identify(settings)` - compute the package identity; compiler,
//!   architecture and build type do not take part (header-only)
//!
//! # Example
//!
//! ```no_run
//! use rapidjson_recipe::{HeaderOnlyRecipe, PackageDescriptor, Recipe, Settings};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), rapidjson_recipe::RecipeError> {
//! let recipe = HeaderOnlyRecipe::new(PackageDescriptor::rapidjson("1.1.0")?);
//! let source = recipe.acquire()?;
//! recipe.package(&source, Path::new("/tmp/rapidjson-pkg"))?;
//! let identity = recipe.identify(&Settings::parse(["compiler=gcc"])?);
//! assert_eq!(identity.to_string(), "rapidjson/1.1.0");
//! # Ok(())
//! # }
//! ```
//!
//! # Layout Produced
//!
//! ```text
//! <destination>/
//!   licenses/license.txt
//!   include/rapidjson/*.h
//! ```

pub mod core;
pub mod helpers;

pub use crate::core::config::RecipeConfig;
pub use crate::core::descriptor::PackageDescriptor;
pub use crate::core::error::RecipeError;
pub use crate::core::host::{RunOptions, RunReport, run_recipe};
pub use crate::core::identity::PackageIdentity;
pub use crate::core::layout::{PackageLayout, SourceLayout, verify_layout};
pub use crate::core::output;
pub use crate::core::recipe::{HeaderOnlyRecipe, Recipe};
pub use crate::core::settings::Settings;
pub use crate::helpers::fetch::{Fetcher, HttpFetcher};
