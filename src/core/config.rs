//! Recipe configuration
//!
//! Resolved in increasing precedence from built-in defaults, the XDG config
//! files (`rapidjson-recipe/config.toml` under `$XDG_CONFIG_DIRS`, then
//! `$XDG_CONFIG_HOME`), an explicit `--config` file, and finally the
//! environment (`RECIPE_HTTP_TIMEOUT`, `RECIPE_REPOSITORY_URL`).

use super::descriptor::RAPIDJSON_REPOSITORY;
use super::error::{RecipeError, Result};
use crate::helpers::fetch::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpFetcher};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "rapidjson-recipe";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Headers a consumer of RapidJSON includes first.
pub const DEFAULT_REQUIRED_HEADERS: &[&str] = &[
    "rapidjson/document.h",
    "rapidjson/writer.h",
    "rapidjson/stringbuffer.h",
];

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    http_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    repository_url: Option<String>,
    work_dir: Option<PathBuf>,
    required_headers: Option<Vec<String>>,
}

impl ConfigToml {
    fn merge(&mut self, other: ConfigToml) {
        if other.http_timeout_secs.is_some() {
            self.http_timeout_secs = other.http_timeout_secs;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if other.repository_url.is_some() {
            self.repository_url = other.repository_url;
        }
        if other.work_dir.is_some() {
            self.work_dir = other.work_dir;
        }
        if other.required_headers.is_some() {
            self.required_headers = other.required_headers;
        }
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeConfig {
    pub http_timeout: Duration,
    pub user_agent: String,
    pub repository_url: String,
    /// Parent of scratch workspaces; system temp dir when `None`.
    pub work_dir: Option<PathBuf>,
    pub required_headers: Vec<String>,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self::from_toml(ConfigToml::default())
    }
}

impl RecipeConfig {
    /// Load from the standard locations, an optional explicit file and the
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = ConfigToml::default();

        for path in find_config_files() {
            if path.exists() {
                merged.merge(read_toml(&path)?);
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(RecipeError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            merged.merge(read_toml(path)?);
        }

        merged.merge(env_overrides()?);
        Ok(Self::from_toml(merged))
    }

    /// Parse a single TOML document on top of the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let parsed = toml::from_str::<ConfigToml>(text).map_err(|e| RecipeError::Config {
            message: format!("invalid TOML: {e}"),
        })?;
        Ok(Self::from_toml(parsed))
    }

    fn from_toml(cfg: ConfigToml) -> Self {
        let secs = cfg
            .http_timeout_secs
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(5, 300);
        Self {
            http_timeout: Duration::from_secs(secs),
            user_agent: cfg
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            repository_url: cfg
                .repository_url
                .unwrap_or_else(|| RAPIDJSON_REPOSITORY.to_string()),
            work_dir: cfg.work_dir,
            required_headers: cfg.required_headers.unwrap_or_else(|| {
                DEFAULT_REQUIRED_HEADERS
                    .iter()
                    .map(|h| h.to_string())
                    .collect()
            }),
        }
    }

    /// HTTP fetcher honoring the timeout and user agent.
    pub fn http_fetcher(&self) -> HttpFetcher {
        HttpFetcher::new()
            .with_timeout(self.http_timeout)
            .with_user_agent(self.user_agent.clone())
    }
}

fn env_overrides() -> Result<ConfigToml> {
    let mut cfg = ConfigToml::default();
    if let Ok(raw) = std::env::var("RECIPE_HTTP_TIMEOUT") {
        let secs = raw.trim().parse::<u64>().map_err(|_| RecipeError::Config {
            message: format!("RECIPE_HTTP_TIMEOUT must be a number of seconds, got '{raw}'"),
        })?;
        cfg.http_timeout_secs = Some(secs);
    }
    if let Ok(url) = std::env::var("RECIPE_REPOSITORY_URL")
        && !url.trim().is_empty()
    {
        cfg.repository_url = Some(url.trim().to_string());
    }
    Ok(cfg)
}

fn split_xdg_config_dirs() -> Vec<PathBuf> {
    let raw = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_owned());
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn xdg_config_home() -> PathBuf {
    if let Ok(raw) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

fn read_toml(path: &Path) -> Result<ConfigToml> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RecipeError::io(format!("failed to read {}", path.display()), e))?;
    toml::from_str::<ConfigToml>(&text).map_err(|e| RecipeError::Config {
        message: format!("invalid TOML in {}: {e}", path.display()),
    })
}

fn find_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for dir in split_xdg_config_dirs() {
        paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(xdg_config_home().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    paths
}
