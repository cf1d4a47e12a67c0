//! Form toolkit configuration.
//!
//! The configuration is a small JSON document stored in the standard
//! configuration directory (`~/.config/dispatch/forms.json` on most
//! platforms). Every key is optional; missing keys fall back to defaults.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "DISPATCH_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "forms.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables for the campaign form toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rows requested per page by the list picker search.
    pub search_page_size: usize,
    /// Inline error shown for a required field left empty.
    pub required_message: String,
    /// Inline error shown when a cascaded field has no eligible option.
    pub empty_pool_message: String,
    /// Suffix used in the "+N Invalid Values" indicator.
    pub invalid_values_label: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            search_page_size: 25,
            required_message: "This field is required".to_string(),
            empty_pool_message: "No options available for the selected channel".to_string(),
            invalid_values_label: "Invalid Values".to_string(),
        }
    }
}

impl FormConfig {
    /// Load from the default location, falling back to defaults on any failure.
    pub fn load() -> Self {
        let path = default_config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Failed to load form config; using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "form config not found; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let mut config: FormConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.search_page_size == 0 {
            config.search_page_size = FormConfig::default().search_page_size;
        }
        Ok(config)
    }
}

/// Get the default path for the form configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dispatch")
        .join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}
