use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const API_URL_ENV: &str = "VIDMARK_API_URL";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "vidmark.log";

/// Client settings, layered: defaults, config file, then env/CLI override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the video library backend.
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "vidmark", "vidmark")
    }

    /// `config.json` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.config_dir().join(CONFIG_FILE))
    }

    /// Where the interactive UI writes its log.
    pub fn log_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.cache_dir().join(LOG_FILE))
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    /// Check and normalize the loaded values.
    pub fn validated(mut self) -> AppResult<Self> {
        let url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        self.api_base_url = url;
        Ok(self)
    }

    /// Full resolution: file (explicit or default), then the override URL
    /// (from `--api-url` or the environment).
    pub fn resolve(explicit: Option<&Path>, api_url: Option<String>) -> AppResult<Self> {
        Self::load(explicit)?.with_api_url(api_url).validated()
    }
}
