//! Configuration: TOML settings plus a manager for loading, saving, and
//! atomic section-level updates.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ApiSettings, ConfigSection, LoggingSettings, Settings, TimerSettings};
