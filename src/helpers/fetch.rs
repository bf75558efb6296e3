//! Fetch capability: download bytes at a URL to a local file.
//!
//! ## GitHub Authentication
//!
//! Set `GITHUB_TOKEN` to raise rate limits when fetching from GitHub:
//! ```bash
//! export GITHUB_TOKEN="ghp_xxxxxxxxxxxxxxxxxxxx"
//! ```

use super::internal::fs_utils;
use super::internal::progress::{self, ProgressGuard};
use crate::core::error::{RecipeError, Result};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("rapidjson-recipe/", env!("CARGO_PKG_VERSION"));

/// Something that can put the bytes behind a URL into a file.
///
/// Returns the number of bytes written. A missing resource must be reported
/// as [`RecipeError::NotFound`] so callers can tell it apart from transport
/// failures.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
    github_token: Option<String>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn request(&self, url: &str) -> ureq::Request {
        let mut request = ureq::get(url)
            .timeout(self.timeout)
            .set("User-Agent", &self.user_agent);

        if let Some(token) = &self.github_token
            && is_github_url(url)
        {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        request
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        fs_utils::ensure_parent_dir(dest)?;

        let filename = dest
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "download".to_string());
        let guard = ProgressGuard::new(progress::create_spinner(&format!(
            "downloading {}",
            filename
        )));

        let response = self.request(url).call().map_err(|e| match e {
            ureq::Error::Status(404, _) => RecipeError::NotFound {
                reference: filename.clone(),
                url: url.to_string(),
            },
            ureq::Error::Status(403, _) if is_github_url(url) => RecipeError::Fetch {
                url: url.to_string(),
                message: "GitHub rate limit exceeded. Try again later or set GITHUB_TOKEN."
                    .to_string(),
            },
            other => RecipeError::Fetch {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;

        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            progress::upgrade_to_bytes(guard.bar(), len);
        }

        let mut file = std::fs::File::create(dest)
            .map_err(|e| RecipeError::io(format!("cannot create {}", dest.display()), e))?;

        let mut reader = response.into_reader();
        let mut buffer = [0u8; 8192];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| RecipeError::Fetch {
                url: url.to_string(),
                message: format!("read error: {}", e),
            })?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])
                .map_err(|e| RecipeError::io(format!("cannot write {}", dest.display()), e))?;
            total_bytes += bytes_read as u64;
            guard.bar().set_position(total_bytes);
        }

        Ok(total_bytes)
    }
}

fn is_github_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split(['/', ':']).next().unwrap_or("");
    host == "github.com" || host.ends_with(".github.com") || host == "codeload.github.com"
}
