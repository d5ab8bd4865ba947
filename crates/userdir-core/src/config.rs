//! Application configuration management.
//!
//! Configuration is stored at `~/.config/userdir/config.json`. Every field is
//! optional in the file; anything missing falls back to the defaults below.
//! A few environment variables override the file (see `apply_env_overrides`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::{DEFAULT_API_URL, DEFAULT_BATCH_SIZE};

/// Application name used for config/data directory paths
const APP_NAME: &str = "userdir";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "USERDIR_API_URL";
pub const ENV_BATCH_SIZE: &str = "USERDIR_BATCH_SIZE";
pub const ENV_DATA_DIR: &str = "USERDIR_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "apiUrl")]
    pub api_url: String,
    #[serde(rename = "batchSize")]
    pub batch_size: usize,
    /// Where the user table and log file live. Defaults to the platform data dir.
    #[serde(rename = "dataDir")]
    pub data_dir: Option<PathBuf>,
    /// No timeout is applied to the fetch unless set.
    #[serde(rename = "requestTimeoutSecs")]
    pub request_timeout_secs: Option<u64>,
    #[serde(rename = "logLevel")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            data_dir: None,
            request_timeout_secs: None,
            log_level: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `USERDIR_*` environment overrides on top of the loaded file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            match raw.parse::<usize>() {
                Ok(size) if size > 0 => self.batch_size = size,
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_BATCH_SIZE),
            }
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Directory holding the user table and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
