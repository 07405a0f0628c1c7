//! Bluetooth power, scan, and connect flows
//!
//! Everything goes through `bluetoothctl` subcommands. Power is a
//! precondition gate enforced by the engine: scan and connect requests made
//! while the radio is off are rejected with a descriptive status before any
//! tool runs. Scanning enables discovery, waits a fixed settle window, lists
//! what was found, and switches discovery back off. Connecting pairs first,
//! then trusts, then connects; a pairing failure short-circuits the rest.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{HardwareError, Result};
use crate::task::BluetoothDevice;
use crate::tool::ToolRunner;

// ----------------------------------------------------------------------------
// Output Parsing
// ----------------------------------------------------------------------------

/// Parse `bluetoothctl devices` output: one `Device <addr> <name...>` per
/// line, anything else ignored.
pub fn parse_devices(raw: &str) -> Vec<BluetoothDevice> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("Device ")?;
            let (address, name) = rest.split_once(' ')?;
            if address.is_empty() || name.trim().is_empty() {
                return None;
            }
            Some(BluetoothDevice {
                address: address.to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}

// ----------------------------------------------------------------------------
// Operations
// ----------------------------------------------------------------------------

/// Switch the radio on or off.
pub async fn set_power(runner: &dyn ToolRunner, on: bool) -> Result<()> {
    let state = if on { "on" } else { "off" };
    let output = runner.run("bluetoothctl", &["power", state]).await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "bluetoothctl power".to_string(),
            detail: output.detail(),
        });
    }
    info!(state, "bluetooth power switched");
    Ok(())
}

/// Discover nearby devices: scan on, settle, list, scan off.
pub async fn scan(
    runner: &dyn ToolRunner,
    settle: Duration,
) -> Result<Vec<BluetoothDevice>> {
    let output = runner.run("bluetoothctl", &["scan", "on"]).await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "bluetoothctl scan".to_string(),
            detail: output.detail(),
        });
    }

    tokio::time::sleep(settle).await;

    let listing = runner.run("bluetoothctl", &["devices"]).await;

    // Always switch discovery back off, even if the listing failed.
    if let Err(err) = runner.run("bluetoothctl", &["scan", "off"]).await {
        warn!(%err, "could not stop bluetooth discovery");
    }

    let listing = listing?;
    if !listing.success {
        return Err(HardwareError::ToolFailed {
            tool: "bluetoothctl devices".to_string(),
            detail: listing.detail(),
        });
    }

    let devices = parse_devices(&listing.stdout);
    debug!(count = devices.len(), "bluetooth scan parsed");
    Ok(devices)
}

/// Pair, trust, and connect to a device by address.
///
/// Pairing failure short-circuits; the trust step is best-effort (some
/// devices connect fine without it); the connect step decides the outcome.
pub async fn connect(runner: &dyn ToolRunner, address: &str) -> Result<()> {
    let output = runner.run("bluetoothctl", &["pair", address]).await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "bluetoothctl pair".to_string(),
            detail: output.detail(),
        });
    }

    match runner.run("bluetoothctl", &["trust", address]).await {
        Ok(output) if !output.success => {
            warn!(address, detail = %output.detail(), "trust step failed, continuing")
        }
        Err(err) => warn!(address, %err, "trust step skipped"),
        Ok(_) => {}
    }

    let output = runner.run("bluetoothctl", &["connect", address]).await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "bluetoothctl connect".to_string(),
            detail: output.detail(),
        });
    }

    info!(address, "bluetooth device connected");
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_basic() {
        let raw = "Device AA:BB:CC:DD:EE:FF Pixel Buds\nDevice 11:22:33:44:55:66 Keyboard K380\n";
        let devices = parse_devices(raw);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(devices[0].name, "Pixel Buds");
        assert_eq!(devices[1].name, "Keyboard K380");
    }

    #[test]
    fn test_parse_devices_ignores_noise() {
        let raw = "[NEW] Controller 00:00:00:00:00:00 kiosk\nAgent registered\nDevice AA:BB:CC:DD:EE:FF Speaker\nDevice broken-line\n";
        let devices = parse_devices(raw);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Speaker");
    }

    #[test]
    fn test_parse_devices_empty_output() {
        assert!(parse_devices("").is_empty());
    }
}
