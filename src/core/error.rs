//! Error types for the recipe lifecycle.

use std::path::PathBuf;

/// Errors raised by the recipe hooks and the host driver.
///
/// Every variant is fatal for the version being packaged. Nothing is retried
/// and partially written data is left for the caller to clean up.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// The requested release does not exist upstream.
    #[error("release not found: {reference} ({url})")]
    NotFound { reference: String, url: String },

    /// Filesystem failure (write, rename, permissions, disk full).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// An asset the package needs is absent from the extracted release.
    #[error("missing {what}: {}", .path.display())]
    MissingAsset { what: String, path: PathBuf },

    /// Transport failure other than "not found".
    #[error("download of {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// The archive is unreadable or contains unsafe entries.
    #[error("extraction failed: {message}")]
    Extract { message: String },

    #[error("invalid package descriptor: {message}")]
    InvalidDescriptor { message: String },

    #[error("invalid setting '{input}': {reason}")]
    InvalidSetting { input: String, reason: String },

    /// Another run holds the destination lock.
    #[error(
        "destination is being packaged by another process; if this is incorrect, delete '{}'",
        .path.display()
    )]
    Locked { path: PathBuf },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl RecipeError {
    /// Wrap an `io::Error` with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn missing(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn extract(message: impl Into<String>) -> Self {
        Self::Extract {
            message: message.into(),
        }
    }

    /// Exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 2,
            Self::MissingAsset { .. } => 3,
            Self::Io { .. }
            | Self::Fetch { .. }
            | Self::Extract { .. }
            | Self::InvalidDescriptor { .. }
            | Self::InvalidSetting { .. }
            | Self::Locked { .. }
            | Self::Config { .. } => 1,
        }
    }
}

pub type Result<T, E = RecipeError> = std::result::Result<T, E>;
