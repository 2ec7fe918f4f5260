//! Static client configuration, parsed once at startup from TOML

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,

    /// Base address of the OrderCo service, without trailing slash
    pub api_base_url: String,

    /// Minutes used when an admin starts a round without a valid duration
    pub default_voting_minutes: u32,

    pub poll_interval_secs: u64,
    pub countdown_tick_secs: u64,
    pub request_timeout_secs: u64,

    /// Verbose logging in the browser console
    pub enable_debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "OrderCo".to_string(),
            app_version: "1.0.0".to_string(),
            api_base_url: "http://orderco.runasp.net/api".to_string(),
            default_voting_minutes: 10,
            poll_interval_secs: 2,
            countdown_tick_secs: 1,
            request_timeout_secs: 15,
            enable_debug: false,
        }
    }
}

impl Config {
    /// Parse config text; keys that are absent keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Like [`Config::from_toml_str`], but falls back to defaults on bad input
    pub fn load_or_default(content: &str) -> Self {
        match Self::from_toml_str(content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Error parsing config, using defaults: {}", e);
                Config::default()
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(self.countdown_tick_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
