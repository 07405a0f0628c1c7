//! Hardware engine configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the connectivity engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Wireless interface the engine manages
    pub wifi_interface: String,

    /// Upper bound on any single external-tool invocation, in seconds
    pub tool_timeout_secs: u64,

    /// How long a Bluetooth scan stays discoverable before listing devices,
    /// in seconds
    pub bluetooth_settle_secs: u64,

    /// Where the transient Wi-Fi credential file is written during a connect
    /// attempt. Removed again on every outcome.
    pub credentials_path: PathBuf,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            wifi_interface: "wlan0".to_string(),
            tool_timeout_secs: 30,
            bluetooth_settle_secs: 3,
            credentials_path: PathBuf::from("/tmp/lumen-wpa.conf"),
        }
    }
}

impl HardwareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wifi_interface(mut self, interface: impl Into<String>) -> Self {
        self.wifi_interface = interface.into();
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn bluetooth_settle(&self) -> Duration {
        Duration::from_secs(self.bluetooth_settle_secs)
    }
}
