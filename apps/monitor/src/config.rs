//! Monitor configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/roomsense/monitor.toml`
//! - Windows: `%APPDATA%/roomsense/monitor.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use roomsense_engine::EngineConfig;
use roomsense_link::RetryPolicy;
use roomsense_protocol::constants::DEFAULT_ENDPOINT;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Device WebSocket endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Samples kept per channel window.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seconds between status reports.
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,

    /// Reconnection backoff.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Reconnection backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Consecutive failures before giving up. Absent means retry forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_capacity() -> usize {
    EngineConfig::default().capacity
}

fn default_report_interval() -> u64 {
    10
}

fn default_initial_delay_ms() -> u64 {
    250
}

fn default_max_delay_secs() -> u64 {
    15
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            capacity: default_capacity(),
            report_interval_secs: default_report_interval(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            backoff_factor: default_backoff_factor(),
            max_attempts: None,
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from the platform path, writing defaults on
    /// first run.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = MonitorConfig::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the current configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Translates into the engine's configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            endpoint: self.endpoint.clone(),
            capacity: self.capacity.max(1),
            retry: RetryPolicy {
                initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
                max_delay: Duration::from_secs(self.retry.max_delay_secs),
                backoff_factor: self.retry.backoff_factor,
                max_attempts: self.retry.max_attempts,
            },
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("roomsense")
            .join("monitor.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("roomsense").join("monitor.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/roomsense/monitor.toml"))
    }
}
