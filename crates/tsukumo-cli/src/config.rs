use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tsukumo_parse::Options;

use crate::error::CliError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: Options,
}

impl AppConfig {
    /// Load `path` if given, else the user file if it exists, else the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let user_path = Self::config_path();
                if user_path.exists() {
                    Self::load_file(&user_path)
                } else {
                    Self::defaults()
                }
            }
        }
    }

    pub fn defaults() -> Result<Self, CliError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    fn load_file(path: &Path) -> Result<Self, CliError> {
        tracing::debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "tsukumo")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
