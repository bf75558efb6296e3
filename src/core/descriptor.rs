//! Package metadata and the values derived from it.

use super::error::{RecipeError, Result};
use serde::Serialize;

/// Upstream repository the release archives are downloaded from.
pub const RAPIDJSON_REPOSITORY: &str = "https://github.com/systelab/rapidjson";

/// Immutable description of one package.
///
/// The version is chosen by whoever invokes the recipe; only the textual
/// metadata is fixed per recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub homepage: String,
    pub license: String,
    pub author: String,
    pub repository: String,
}

impl PackageDescriptor {
    /// RapidJSON at the given version.
    pub fn rapidjson(version: &str) -> Result<Self> {
        let descriptor = Self {
            name: "rapidjson".to_string(),
            version: version.trim().to_string(),
            description: "A fast JSON parser/generator for C++ with both SAX/DOM style API"
                .to_string(),
            homepage: "http://rapidjson.org/".to_string(),
            license: "MIT".to_string(),
            author: "CSW <csw@werfen.com>".to_string(),
            repository: RAPIDJSON_REPOSITORY.to_string(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Point the descriptor at a different repository (mirrors, forks, tests).
    pub fn with_repository(mut self, repository: &str) -> Result<Self> {
        self.repository = repository.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    /// Check the invariants every hook relies on.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(invalid("package name is empty"));
        }
        if self.repository.is_empty() {
            return Err(invalid("repository URL is empty"));
        }
        validate_version(&self.version)
    }

    /// `<repository>/archive/v<version>.tar.gz`
    pub fn archive_url(&self) -> String {
        format!(
            "{}/archive/v{}.tar.gz",
            self.repository.trim_end_matches('/'),
            self.version
        )
    }

    /// Top-level directory produced by extracting the release archive.
    pub fn extracted_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// `<name>/<version>`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// The version ends up in a URL and in a directory name, so it must be a
/// single plain path segment.
fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(invalid("version is empty"));
    }
    if version == "." || version.contains("..") {
        return Err(invalid(format!("version '{}' is not a plain name", version)));
    }
    if version
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(invalid(format!(
            "version '{}' contains path separators or whitespace",
            version
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> RecipeError {
    RecipeError::InvalidDescriptor {
        message: message.into(),
    }
}
