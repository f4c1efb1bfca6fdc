//! Application configuration management.
//!
//! Two layers live here: the persisted `Config` file (last username, optional
//! URL overrides) and the resolved `ApiConfig` every transport is built from.
//!
//! Configuration is stored at `~/.config/bazaar/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bazaar";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the REST API base URL
pub const API_URL_ENV: &str = "BAZAAR_API_URL";

/// Environment variable overriding the public web app URL
pub const APP_URL_ENV: &str = "BAZAAR_APP_URL";

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Timeout for ordinary requests.
pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for endpoints known to be slow (cold aggregate queries, search).
pub const SLOW_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for large file uploads.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub app_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve the API endpoints: environment first, then this file, then defaults.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::resolve(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(APP_URL_ENV).ok(),
            self,
        )
    }
}

/// Endpoints every transport variant is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub app_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, app_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(base_url.into()),
            app_url: normalize_url(app_url.into()),
        }
    }

    fn resolve(env_api: Option<String>, env_app: Option<String>, config: &Config) -> Self {
        let pick = |env: Option<String>, file: &Option<String>, default: &str| {
            env.filter(|v| !v.trim().is_empty())
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(
            pick(env_api, &config.api_url, DEFAULT_API_URL),
            pick(env_app, &config.app_url, DEFAULT_APP_URL),
        )
    }

    /// Join a relative path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Public link to an ad on the web app, used when sharing.
    pub fn ad_link(&self, ad_id: i64) -> String {
        format!("{}/ads/{}", self.app_url, ad_id)
    }
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
