//! Application configuration.
//!
//! Loaded once from a JSON file (`config.json` under the platform config
//! dir by default). The TVDB API key is optional at load time: its absence
//! only fails the first remote metadata call, never startup.

use crate::errors::AppError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TVDB_BASE_URL: &str = "https://api4.thetvdb.com/v4";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tvdb: TvdbConfig,
    pub jellyfin: Option<JellyfinConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvdbConfig {
    /// Project API key for TVDB v4. No default: remote candidate fetching
    /// is disabled (fails per-call) until the user supplies one.
    pub api_key: Option<String>,
    #[serde(default = "default_tvdb_base_url")]
    pub base_url: String,
}

impl Default for TvdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tvdb_base_url(),
        }
    }
}

fn default_tvdb_base_url() -> String {
    DEFAULT_TVDB_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinConfig {
    pub server_url: String,
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from the platform config dir (e.g. `~/.config/marquee/config.json`).
    pub fn load_default() -> Result<Self, AppError> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        Self::load(path)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("marquee").join("config.json"))
    }
}
