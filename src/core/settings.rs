//! Host settings and user options
//!
//! These are the axes a host tool would normally use to tell binary packages
//! apart. Recipes decide which of them survive into the package identity.

use super::error::{RecipeError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Prefix that marks a `key=value` pair as a user option.
const OPTION_PREFIX: &str = "options.";

/// Settings and options for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub compiler: Option<String>,
    pub compiler_version: Option<String>,
    pub build_type: Option<String>,
    /// Settings without a dedicated field (e.g. `compiler.libcxx`).
    pub extra: BTreeMap<String, String>,
    pub options: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of `key=value` strings.
    ///
    /// Later entries override earlier ones.
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::default();
        for entry in entries {
            let entry = entry.as_ref();
            let (key, value) = split_entry(entry)?;
            settings.set(key, value);
        }
        Ok(settings)
    }

    /// Assign one setting or option.
    pub fn set(&mut self, key: &str, value: &str) {
        let value = value.to_string();
        if let Some(option) = key.strip_prefix(OPTION_PREFIX) {
            self.options.insert(option.to_string(), value);
            return;
        }
        match key {
            "os" => self.os = Some(value),
            "arch" => self.arch = Some(value),
            "compiler" => self.compiler = Some(value),
            "compiler.version" | "compiler_version" => self.compiler_version = Some(value),
            "build_type" => self.build_type = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// All settings (not options) as a sorted map, using host key names.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.extra.clone();
        let typed = [
            ("os", &self.os),
            ("arch", &self.arch),
            ("compiler", &self.compiler),
            ("compiler.version", &self.compiler_version),
            ("build_type", &self.build_type),
        ];
        for (key, value) in typed {
            if let Some(value) = value {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty() && self.options.is_empty()
    }
}

fn split_entry(entry: &str) -> Result<(&str, &str)> {
    let (key, value) = entry.split_once('=').ok_or_else(|| RecipeError::InvalidSetting {
        input: entry.to_string(),
        reason: "expected key=value".to_string(),
    })?;
    let key = key.trim();
    if key.is_empty() || key == OPTION_PREFIX.trim_end_matches('.') || key == OPTION_PREFIX {
        return Err(RecipeError::InvalidSetting {
            input: entry.to_string(),
            reason: "empty key".to_string(),
        });
    }
    Ok((key, value.trim()))
}
