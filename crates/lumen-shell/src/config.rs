//! Shell configuration
//!
//! One TOML document covering the kiosk runtime, the hardware engine, and
//! storage placement. Loading order: defaults, then the config file (the
//! given path, or the user config dir). A missing file is fine; a present
//! but malformed file is an error worth failing startup over.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lumen_core::{ConfigError, KioskConfig};
use lumen_hardware::HardwareConfig;

// ----------------------------------------------------------------------------
// Shell Configuration
// ----------------------------------------------------------------------------

/// Storage placement settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the durable state file. Defaults to
    /// `<user data dir>/lumen/state.json`.
    pub state_file: Option<PathBuf>,
}

/// Complete configuration for the shell binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Kiosk runtime configuration (screensaver, menu, notifications)
    #[serde(default)]
    pub kiosk: KioskConfig,

    /// Hardware engine configuration
    #[serde(default)]
    pub hardware: HardwareConfig,

    /// Storage placement
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ShellConfig {
    /// Load configuration, layering the config file over defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Loading(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default = Self::default_config_path();
                default.filter(|p| p.exists())
            }
        };

        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|err| {
                    ConfigError::FileSystem(format!(
                        "could not read {}: {}",
                        path.display(),
                        err
                    ))
                })?;
                toml::from_str(&raw).map_err(|err| {
                    ConfigError::Loading(format!("could not parse {}: {}", path.display(), err))
                })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lumen").join("config.toml"))
    }

    /// Resolve where the durable state file lives, honoring an explicit data
    /// directory override first.
    pub fn state_file(&self, data_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = data_dir {
            return dir.join("state.json");
        }
        if let Some(path) = &self.storage.state_file {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("lumen").join("state.json"))
            .unwrap_or_else(|| PathBuf::from("lumen-state.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kiosk.validate()?;
        if self.hardware.wifi_interface.trim().is_empty() {
            return Err(ConfigError::Validation(
                "wifi interface must not be empty".to_string(),
            ));
        }
        if self.hardware.tool_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tool timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ShellConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_takes_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[kiosk]\nscreensaver_timeout_secs = 60\n").unwrap();

        let config = ShellConfig::load(Some(&path)).unwrap();
        assert_eq!(config.kiosk.screensaver_timeout_secs, 60);
        assert_eq!(config.kiosk.items_per_page, 5);
        assert_eq!(config.hardware.wifi_interface, "wlan0");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "kiosk = not toml {").unwrap();
        assert!(ShellConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(ShellConfig::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }

    #[test]
    fn test_data_dir_override_wins_for_state_file() {
        let config = ShellConfig::default();
        let state = config.state_file(Some(Path::new("/data")));
        assert_eq!(state, PathBuf::from("/data/state.json"));
    }

    #[test]
    fn test_invalid_interface_rejected() {
        let mut config = ShellConfig::default();
        config.hardware.wifi_interface = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
