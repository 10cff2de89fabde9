//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `dashboard.toml`.
//!     loads configuration from file or falls back to defaults, then applies
//!     environment overrides.
//!
//! structure:
//!     - DeviceConfig: where the tank controller lives and how long to wait for it.
//!     - PollingConfig: how often /status is fetched.
//!     - ServerConfig: where the dashboard is served.
//!     - LoggingConfig: log filter and snapshot dumps.
//!
//! environment:
//!     - DASHBOARD_DEVICE_URL overrides device.base_url
//!     - DASHBOARD_BIND overrides server.bind
//!     - RUST_LOG overrides logging.level
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub device: DeviceConfig,
    pub polling: PollingConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceConfig {
    /// e.g. "http://192.168.159.24:5000", no trailing path
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// filter directive (`RUST_LOG` syntax)
    pub level: String,
    /// log every parsed snapshot
    pub show_device_data: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.159.24:5000".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "tank_dashboard=info,tower_http=info".to_string(),
            show_device_data: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl DashboardConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: DashboardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load with default fallback, then environment overrides and validation
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut config = Self::from_search_paths();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_search_paths() -> Self {
        let paths = [
            PathBuf::from("config").join("dashboard.toml"),
            PathBuf::from("..").join("config").join("dashboard.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }

    fn apply_env_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("DASHBOARD_DEVICE_URL") {
            self.device.base_url = val;
        }
        if let Some(val) = var("DASHBOARD_BIND") {
            self.server.bind = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.level = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.device.base_url).map_err(|e| {
            ConfigError::Validation(format!("device.base_url {:?}: {}", self.device.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "device.base_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Validation("polling.interval_ms must be non-zero".to_string()));
        }
        if self.device.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "device.request_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("┌─────────────────────────────────────────┐");
        println!("│        DASHBOARD CONFIGURATION          │");
        println!("├─────────────────────────────────────────┤");
        println!("│ Device: {}", self.device.base_url);
        println!("│ Request Timeout: {}ms", self.device.request_timeout_ms);
        println!("│ Poll Interval: {}ms", self.polling.interval_ms);
        println!("│ Listen: {}", self.server.bind);
        println!("│ Log Level: {}", self.logging.level);
        println!("└─────────────────────────────────────────┘");
    }
}
