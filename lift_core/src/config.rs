//! Configuration file support for Lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub streak: StreakConfig,

    #[serde(default)]
    pub library: LibraryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Active session parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum snapshot age still eligible for crash recovery
    #[serde(default = "default_recovery_window_minutes")]
    pub recovery_window_minutes: i64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recovery_window_minutes: default_recovery_window_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl SessionConfig {
    pub fn recovery_window(&self) -> Duration {
        Duration::minutes(self.recovery_window_minutes)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

/// Streak calculation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            max_lookback_days: default_max_lookback_days(),
        }
    }
}

/// Exercise library cache parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_list_ttl_minutes")]
    pub list_ttl_minutes: i64,

    #[serde(default = "default_taxonomy_ttl_hours")]
    pub taxonomy_ttl_hours: i64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            list_ttl_minutes: default_list_ttl_minutes(),
            taxonomy_ttl_hours: default_taxonomy_ttl_hours(),
            page_size: default_page_size(),
        }
    }
}

/// Upper bound for the recovery window and cache lifetimes (30 days)
const MAX_WINDOW_MINUTES: i64 = 30 * 24 * 60;

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("lift")
}

fn default_recovery_window_minutes() -> i64 {
    120
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_max_lookback_days() -> u32 {
    730
}

fn default_list_ttl_minutes() -> i64 {
    60
}

fn default_taxonomy_ttl_hours() -> i64 {
    24
}

fn default_page_size() -> usize {
    20
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("lift").join("config.toml")
    }

    /// Reject values the session machine and caches cannot work with
    pub fn validate(&self) -> Result<()> {
        check_range(
            "session.recovery_window_minutes",
            self.session.recovery_window_minutes,
            1,
            MAX_WINDOW_MINUTES,
        )?;
        check_range(
            "library.list_ttl_minutes",
            self.library.list_ttl_minutes,
            0,
            MAX_WINDOW_MINUTES,
        )?;
        check_range(
            "library.taxonomy_ttl_hours",
            self.library.taxonomy_ttl_hours,
            0,
            MAX_WINDOW_MINUTES / 60,
        )?;
        if self.session.tick_interval_ms == 0 {
            return Err(Error::Config("session.tick_interval_ms must be positive".into()));
        }
        if self.library.page_size == 0 {
            return Err(Error::Config("library.page_size must be positive".into()));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.recovery_window(), Duration::hours(2));
        assert_eq!(config.session.tick_interval_ms, 1000);
        assert_eq!(config.streak.max_lookback_days, 730);
        assert_eq!(config.library.list_ttl_minutes, 60);
        assert_eq!(config.library.taxonomy_ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.session.recovery_window_minutes = 45;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.session.recovery_window_minutes, 45);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[streak]
max_lookback_days = 90
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.streak.max_lookback_days, 90);
        assert_eq!(config.session.recovery_window_minutes, 120); // default
    }

    #[test]
    fn test_invalid_recovery_window_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nrecovery_window_minutes = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let mut config = Config::default();
        config.session.recovery_window_minutes = i64::MAX;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.library.taxonomy_ttl_hours = 721;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_cache_ttls_must_not_be_negative() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[library]\nlist_ttl_minutes = -5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("library.list_ttl_minutes"));

        // Zero means entries expire immediately
        std::fs::write(&path, "[library]\nlist_ttl_minutes = 0\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().library.list_ttl_minutes, 0);
    }
}
