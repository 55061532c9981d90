//! Application configuration
//!
//! Read from a TOML file (`~/.config/chargenet/config.toml` by default,
//! `CHARGENET_CONFIG` overrides). Every section and key is optional; a
//! missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::charging::EnergyPolicyKind;
use crate::application::workers::{WorkerSettings, WorkerToggles};
use crate::application::{BookingSettings, ChargingSettings, SearchSettings, ServiceSettings};
use crate::infrastructure::DatabaseConfig;
use crate::shared::retry::RetryConfig;

pub const CONFIG_ENV: &str = "CHARGENET_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub booking: BookingSection,
    pub workers: WorkersSection,
    pub charging: ChargingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for tasks to stop after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, e.g. `info` or `chargenet=debug,sea_orm=warn`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSection {
    pub past_buffer_minutes: i64,
    pub code_attempts: u32,
    pub upcoming_horizon_hours: i64,
    pub check_in_grace_minutes: i64,
    pub search_result_cap: usize,
    pub default_radius_km: f64,
}

impl Default for BookingSection {
    fn default() -> Self {
        let booking = BookingSettings::default();
        let search = SearchSettings::default();
        Self {
            past_buffer_minutes: booking.past_buffer_minutes,
            code_attempts: booking.code_attempts,
            upcoming_horizon_hours: booking.upcoming_horizon_hours,
            check_in_grace_minutes: booking.check_in_grace_minutes,
            search_result_cap: search.result_cap,
            default_radius_km: search.default_radius_km,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersSection {
    pub poll_interval_secs: u64,
    pub expiry_grace_minutes: i64,
    pub reminder_minutes: i64,
    pub paused_max_minutes: i64,
    pub enabled: WorkerToggles,
}

impl Default for WorkersSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            expiry_grace_minutes: 15,
            reminder_minutes: 30,
            paused_max_minutes: 30,
            enabled: WorkerToggles::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingSection {
    pub battery_capacity_kwh: f64,
    pub energy_policy: EnergyPolicyKind,
}

impl Default for ChargingSection {
    fn default() -> Self {
        Self {
            battery_capacity_kwh: 60.0,
            energy_policy: EnergyPolicyKind::SocDelta,
        }
    }
}

/// `~/.config/chargenet/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("chargenet").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// `CHARGENET_CONFIG` if set, else [`default_config_path`].
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

impl AppConfig {
    /// Load and validate. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.server.api_port == 0 {
            return invalid("server.api_port must be non-zero".into());
        }
        if self.database.url.trim().is_empty() {
            return invalid("database.url is empty".into());
        }
        if self.database.max_connections == 0 {
            return invalid("database.max_connections must be at least 1".into());
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            return invalid(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            ));
        }
        if self.booking.code_attempts == 0 {
            return invalid("booking.code_attempts must be at least 1".into());
        }
        if self.booking.past_buffer_minutes < 0 || self.booking.check_in_grace_minutes < 0 {
            return invalid("booking buffers must not be negative".into());
        }
        if self.booking.upcoming_horizon_hours <= 0 {
            return invalid("booking.upcoming_horizon_hours must be positive".into());
        }
        if self.booking.search_result_cap == 0 || self.booking.default_radius_km <= 0.0 {
            return invalid("booking search cap and radius must be positive".into());
        }
        if self.workers.poll_interval_secs == 0 {
            return invalid("workers.poll_interval_secs must be non-zero".into());
        }
        if self.workers.expiry_grace_minutes < 0
            || self.workers.reminder_minutes <= 0
            || self.workers.paused_max_minutes <= 0
        {
            return invalid("worker windows must be positive".into());
        }
        let capacity = self.charging.battery_capacity_kwh;
        if !capacity.is_finite() || capacity <= 0.0 {
            return invalid("charging.battery_capacity_kwh must be positive".into());
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            booking: BookingSettings {
                past_buffer_minutes: self.booking.past_buffer_minutes,
                code_attempts: self.booking.code_attempts,
                upcoming_horizon_hours: self.booking.upcoming_horizon_hours,
                check_in_grace_minutes: self.booking.check_in_grace_minutes,
            },
            charging: ChargingSettings {
                battery_capacity_kwh: self.charging.battery_capacity_kwh,
                paused_max_minutes: self.workers.paused_max_minutes,
                energy_policy: self.charging.energy_policy,
            },
            search: SearchSettings {
                result_cap: self.booking.search_result_cap,
                default_radius_km: self.booking.default_radius_km,
                past_buffer_minutes: self.booking.past_buffer_minutes,
            },
            retry: RetryConfig::default(),
        }
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            poll_interval: std::time::Duration::from_secs(self.workers.poll_interval_secs),
            expiry_grace_minutes: self.workers.expiry_grace_minutes,
            reminder_minutes: self.workers.reminder_minutes,
            enabled: self.workers.enabled,
        }
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.api_port, 8080);
        assert_eq!(cfg.booking.code_attempts, 5);
        assert_eq!(cfg.workers.poll_interval_secs, 60);
        assert_eq!(cfg.charging.energy_policy, EnergyPolicyKind::SocDelta);
        assert!(cfg.workers.enabled.paused_timeout);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9100

            [workers]
            reminder_minutes = 45

            [workers.enabled]
            reminder = false

            [charging]
            energy_policy = "telemetry"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 9100);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.workers.reminder_minutes, 45);
        assert_eq!(cfg.workers.expiry_grace_minutes, 15);
        assert!(!cfg.workers.enabled.reminder);
        assert!(cfg.workers.enabled.expiry);
        assert_eq!(cfg.charging.energy_policy, EnergyPolicyKind::Telemetry);

        let settings = cfg.worker_settings();
        assert_eq!(settings.poll_interval, std::time::Duration::from_secs(60));
        assert_eq!(settings.reminder_minutes, 45);
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.workers.poll_interval_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::default();
        cfg.booking.code_attempts = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.api_port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_energy_policy_fails_to_parse() {
        let err = AppConfig::from_toml("[charging]\nenergy_policy = \"guess\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("chargenet-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.booking.check_in_grace_minutes = 20;
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.booking.check_in_grace_minutes, 20);
        assert_eq!(loaded.service_settings().booking.check_in_grace_minutes, 20);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/chargenet/config.toml")).unwrap();
        assert_eq!(cfg.server.shutdown_timeout, 30);
    }

    #[test]
    fn default_path_ends_in_chargenet_config() {
        let path = default_config_path();
        assert!(path.ends_with("config.toml"));
    }
}
