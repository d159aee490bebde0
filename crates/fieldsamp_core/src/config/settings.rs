//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Backend endpoint settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Timer display settings.
    #[serde(default)]
    pub timer: TimerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the sampling backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for authenticated calls. Empty means unauthenticated.
    #[serde(default)]
    pub token: String,

    /// Address whose samples the CLI watches by default.
    #[serde(default)]
    pub default_address_id: i64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            default_address_id: 0,
        }
    }
}

/// Timer display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Seconds between elapsed-time recomputations while running.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// How long a fetched sample list stays fresh.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: i64,
}

fn default_tick_interval() -> u64 {
    1
}

fn default_cache_ttl() -> i64 {
    30
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default tracing filter when RUST_LOG is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Identifies one settings section for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Api,
    Timer,
    Logging,
}

impl ConfigSection {
    /// The TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Api => "api",
            ConfigSection::Timer => "timer",
            ConfigSection::Logging => "logging",
        }
    }
}
