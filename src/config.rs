use std::{path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "yt_downloader.toml";
/// Overrides `backend_url`
pub const BACKEND_ENV: &str = "YT_DOWNLOADER_BACKEND";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the download backend
    pub backend_url: String,
    /// Delay between two status polls of the same task
    pub poll_interval_ms: u64,
    /// Period of the developer log refresh while the panel is open
    pub log_interval_ms: u64,
    /// How long a notification stays up
    pub snackbar_ms: u64,
    /// Upper bound for a single backend request, connect included
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            poll_interval_ms: 1000,
            log_interval_ms: 500,
            snackbar_ms: 4000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Reads `yt_downloader.toml` if present, then applies the environment override
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        if let Ok(url) = std::env::var(BACKEND_ENV) {
            if !url.trim().is_empty() {
                config.backend_url = url.trim().to_string();
            }
        }
        config.backend_base()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Base URL with a trailing slash so relative joins keep any path prefix.
    /// Only http(s) addresses that can carry a path are accepted.
    pub fn backend_base(&self) -> Result<Url, ConfigError> {
        let mut raw = self.backend_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|source| ConfigError::BackendUrl {
            url: self.backend_url.clone(),
            source,
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedBackend(self.backend_url.clone()));
        }
        Ok(url)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Never zero; tokio's interval panics on a zero period
    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms.max(1))
    }

    pub fn snackbar_duration(&self) -> Duration {
        Duration::from_millis(self.snackbar_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
