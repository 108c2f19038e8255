//! Configuration management for Casebook using the prefer crate.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default origin of the remote analysis service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds. Summarization and chat answers run
/// remote agents, so this is generous.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory for the session mirror.
    pub data_dir: PathBuf,
    /// Origin of the remote analysis service.
    pub endpoint: Url,
    /// Request timeout in seconds.
    pub request_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to the platform data directory for session state
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("casebook");

        Self {
            data_dir,
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Path of the persisted bearer credential.
    pub fn credential_path(&self) -> PathBuf {
        self.data_dir.join("credential")
    }

    /// Path of the persisted session state.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the remote analysis service.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Target directory for session data.
    #[serde(default)]
    pub target: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers casebook config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("casebook").await {
            Ok(pref_config) => {
                let endpoint: Option<String> = pref_config.get("endpoint").ok();
                let target: Option<String> = pref_config.get("target").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();

                Config {
                    endpoint,
                    target,
                    request_timeout,
                }
            }
            Err(e) => {
                tracing::debug!("No configuration file loaded: {}", e);
                Config::default()
            }
        }
    }

    /// Merge this configuration into settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(target) = &self.target {
            let expanded = shellexpand::tilde(target);
            settings.data_dir = PathBuf::from(expanded.as_ref());
        }
        if let Some(endpoint) = &self.endpoint {
            match Url::parse(endpoint) {
                Ok(url) => settings.endpoint = url,
                Err(e) => tracing::warn!("Ignoring invalid endpoint {:?}: {}", endpoint, e),
            }
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        settings
    }
}
