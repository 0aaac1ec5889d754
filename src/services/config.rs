//! User configuration stored at `~/.cloudcost/config.json`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CloudCostError, Period, Result};

/// Color scheme preference; `Auto` follows the terminal background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemePreference,
    pub default_period: Period,
    /// Simulated fetch latency of the mock provider
    pub refresh_delay_ms: u64,
    /// Snapshot file to read instead of mock data
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Auto,
            default_period: Period::default(),
            refresh_delay_ms: 2000,
            data_file: None,
        }
    }
}

impl Config {
    /// `~/.cloudcost/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| CloudCostError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".cloudcost").join("config.json"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| CloudCostError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemePreference::Auto);
        assert_eq!(config.default_period, Period::Month);
        assert_eq!(config.refresh_delay(), Duration::from_millis(2000));
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme":"light","default_period":"1y"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, ThemePreference::Light);
        assert_eq!(config.default_period, Period::Year);
        assert_eq!(config.refresh_delay_ms, 2000);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme":"purple"}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CloudCostError::Config(_)));
    }

    #[test]
    fn test_data_file_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"data_file":"/tmp/billing.json","refresh_delay_ms":0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/billing.json")));
        assert!(config.refresh_delay().is_zero());
    }
}
