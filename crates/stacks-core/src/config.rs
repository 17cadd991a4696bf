//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the last used username and where the
//! credential token is kept.
//!
//! Configuration is stored at `~/.config/stacks/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "stacks";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the environment nor the config names one
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "STACKS_API_URL";

/// Environment variable overriding `last_username`
pub const USERNAME_ENV: &str = "STACKS_USERNAME";

/// Backend for the persisted token slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_username: Option<String>,
    #[serde(default)]
    pub token_storage: TokenStorage,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the token file and logs
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// API base URL: `STACKS_API_URL`, then the config file, then the default
    pub fn resolved_api_url(&self) -> String {
        Self::pick(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Username to prefill on the login form
    pub fn resolved_username(&self) -> Option<String> {
        Self::pick(std::env::var(USERNAME_ENV).ok(), self.last_username.as_deref())
    }

    fn pick(env: Option<String>, configured: Option<&str>) -> Option<String> {
        env.map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                configured
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
    }

    /// Token slot backend selected by `token_storage`
    pub fn token_store(&self) -> Result<Box<dyn TokenStore>> {
        Ok(match self.token_storage {
            TokenStorage::File => Box::new(FileTokenStore::new(&Self::data_dir()?)),
            TokenStorage::Keyring => Box::new(KeyringTokenStore),
        })
    }
}
