//! Client configuration for reaching the action service.
//!
//! Settings are read from a small JSON file in the standard configuration
//! directory (`~/.config/actionctl/config.json` on most platforms) and then
//! overridden by environment variables.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "ACTIONCTL_CONFIG_PATH";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "ACTIONCTL_API_URL";
/// Environment variable supplying the auth token.
pub const AUTH_TOKEN_ENV: &str = "ACTIONCTL_AUTH_TOKEN";
/// Base URL used when neither the file nor the environment provides one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9101/v1";

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_token: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl ClientConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path();
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load the config file at `path` without environment overrides.
    ///
    /// A missing file yields defaults; a malformed file is reported and ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded client config");
                    Ok(config)
                }
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse config file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(token) = non_empty_env(AUTH_TOKEN_ENV) {
            self.auth_token = Some(token);
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Get the default path for the client configuration file.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("actionctl")
        .join(CONFIG_FILE_NAME)
}
