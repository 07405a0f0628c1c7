//! Kiosk runtime configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the kiosk runtime (orchestrator, menu, notifications)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Seconds of input silence before the screensaver takes over
    pub screensaver_timeout_secs: u64,

    /// Menu items per page
    pub items_per_page: usize,

    /// UI frame cadence in milliseconds
    pub frame_interval_ms: u64,

    /// Maximum simultaneously pending notifications
    pub notification_capacity: usize,

    /// Cadence of the background due-event refresh, in seconds
    pub background_refresh_secs: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            screensaver_timeout_secs: 30,
            items_per_page: 5,
            frame_interval_ms: 33,
            notification_capacity: 3,
            background_refresh_secs: 60,
        }
    }
}

impl KioskConfig {
    pub fn screensaver_timeout(&self) -> Duration {
        Duration::from_secs(self.screensaver_timeout_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn background_refresh(&self) -> Duration {
        Duration::from_secs(self.background_refresh_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screensaver_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "screensaver timeout must be greater than 0".to_string(),
            ));
        }
        if self.items_per_page == 0 {
            return Err(ConfigError::Validation(
                "items per page must be greater than 0".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "frame interval must be greater than 0".to_string(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Validation(
                "notification capacity must be greater than 0".to_string(),
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
        assert!(KioskConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = KioskConfig::default();
        config.items_per_page = 0;
        assert!(config.validate().is_err());

        let mut config = KioskConfig::default();
        config.screensaver_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
