//! Configuration file handling with TOML support.

use crate::api;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// API credentials and endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: f64,

    /// Quiet window after the last keystroke before a search fires, in ms
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// API timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// How many coins the top listing should contain
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            debounce_ms: default_debounce_ms(),
            timeout: default_timeout(),
            limit: default_limit(),
        }
    }
}

fn default_refresh_interval() -> f64 {
    60.0
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_timeout() -> u64 {
    10
}
fn default_limit() -> u32 {
    10
}

/// API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// RapidAPI key. Can also come from the COINWATCH_API_KEY env var.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the Coinranking gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value for the X-RapidAPI-Host header
    #[serde(default = "default_api_host")]
    pub api_host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            api_host: default_api_host(),
        }
    }
}

fn default_base_url() -> String {
    api::DEFAULT_BASE_URL.to_string()
}
fn default_api_host() -> String {
    api::DEFAULT_API_HOST.to_string()
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Start in dark mode (a saved session preference wins over this)
    #[serde(default)]
    pub dark_mode: bool,

    /// Show the recent-searches row under the search bar
    #[serde(default = "default_true")]
    pub show_history: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_history: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from default location or fall back to defaults.
    pub fn load_or_default() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to load config: {}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("coinwatch").join("config.toml"))
    }

    /// Save configuration to file.
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Generate a sample configuration file content.
pub fn sample_config() -> &'static str {
    r##"# Coinwatch Configuration File
# A terminal dashboard for cryptocurrency prices

[general]
# Refresh interval in seconds
refresh_interval = 60.0
# Quiet window after the last keystroke before a search fires (ms)
debounce_ms = 500
# API timeout in seconds
timeout = 10
# How many coins the top listing should contain
limit = 10

[api]
# RapidAPI key for the Coinranking API (or set COINWATCH_API_KEY)
api_key = ""
# Endpoints; only change these if you proxy the API
base_url = "https://coinranking1.p.rapidapi.com"
api_host = "coinranking1.p.rapidapi.com"

[display]
# Start in dark mode
dark_mode = false
# Show the recent-searches row under the search bar
show_history = true
"##
}
