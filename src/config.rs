//! Configuration module
//!
//! Reads `~/.config/wwcp/config.toml` (or the file named by `WWCP_CONFIG`).
//! Every section and key is optional.
//!
//! ```toml
//! [status]
//! max_status_schedule_size = 15
//! max_admin_status_schedule_size = 15
//!
//! [events]
//! bus_capacity = 1024
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::application::events::event_bus::DEFAULT_CAPACITY;
use crate::domain::status::DEFAULT_MAX_STATUS_SCHEDULE_SIZE;
use crate::support::{DomainError, DomainResult};

/// Environment variable overriding the configuration path
pub const CONFIG_ENV_VAR: &str = "WWCP_CONFIG";

/// Status history sizing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub max_status_schedule_size: u16,
    pub max_admin_status_schedule_size: u16,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            max_status_schedule_size: DEFAULT_MAX_STATUS_SCHEDULE_SIZE,
            max_admin_status_schedule_size: DEFAULT_MAX_STATUS_SCHEDULE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the broadcast event bus
    pub bus_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive for binaries embedding this crate
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub status: StatusConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn load(path: &Path) -> DomainResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&raw)?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> DomainResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| DomainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `WWCP_CONFIG` or the default path; a missing file yields
    /// the defaults.
    pub fn load_or_default() -> DomainResult<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        if path.exists() {
            Self::load(&path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.status.max_status_schedule_size == 0 {
            return Err(DomainError::Config(
                "status.max_status_schedule_size must be greater than zero".to_string(),
            ));
        }
        if self.status.max_admin_status_schedule_size == 0 {
            return Err(DomainError::Config(
                "status.max_admin_status_schedule_size must be greater than zero".to_string(),
            ));
        }
        if self.events.bus_capacity == 0 {
            return Err(DomainError::Config(
                "events.bus_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wwcp")
        .join("config.toml")
}
