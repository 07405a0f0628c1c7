//! Wi-Fi scan, connect, and disconnect flows
//!
//! Scanning parses `iwlist` output with marker-based line scanning: a new
//! record starts at each `Cell` delimiter, fields are extracted independently
//! of ordering, and a record only counts once it has a name. When the scan
//! tool itself fails, a degraded parse pulls bare ESSIDs out of whatever
//! output exists and marks them encrypted, so a flaky driver yields a usable
//! (if cautious) list instead of nothing.
//!
//! Connecting writes a transient credential file, starts the supplicant, and
//! requests a DHCP lease; the credential file is removed on every outcome and
//! any partial failure tears the interface back down to its pre-attempt
//! state.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::HardwareConfig;
use crate::error::{HardwareError, Result};
use crate::task::{NetworkRecord, Quality, Security};
use crate::tool::ToolRunner;

// ----------------------------------------------------------------------------
// Scan Output Parsing
// ----------------------------------------------------------------------------

#[derive(Default)]
struct PartialRecord {
    ssid: Option<String>,
    encrypted: Option<bool>,
    quality: Option<Quality>,
    security: Option<Security>,
}

impl PartialRecord {
    fn finish(self) -> Option<NetworkRecord> {
        let ssid = self.ssid?;
        Some(NetworkRecord {
            ssid,
            encrypted: self.encrypted.unwrap_or(false),
            quality: self.quality.unwrap_or(Quality::Unknown),
            security: self.security.unwrap_or(Security::Unknown),
        })
    }
}

fn security_rank(security: Security) -> u8 {
    match security {
        Security::Unknown => 0,
        Security::Wpa => 1,
        Security::Wpa2 => 2,
        Security::Wpa3 => 3,
    }
}

/// Pull the quoted ESSID out of a line like `ESSID:"Home"`. Hidden and empty
/// names are rejected.
fn parse_essid(line: &str) -> Option<String> {
    let rest = line.split_once("ESSID:")?.1.trim();
    let inner = rest
        .strip_prefix('"')
        .and_then(|r| r.split_once('"'))
        .map(|(name, _)| name)
        .unwrap_or(rest);

    if inner.is_empty() || inner == "<hidden>" || inner.starts_with("\\x00") {
        return None;
    }
    Some(inner.to_string())
}

/// Parse `Quality=70/70` into a percentage.
fn parse_quality(line: &str) -> Option<Quality> {
    let rest = line.split_once("Quality=")?.1;
    let token = rest.split_whitespace().next()?;
    let (num, den) = token.split_once('/')?;
    let num: u32 = num.parse().ok()?;
    let den: u32 = den.parse().ok()?;
    if den == 0 {
        return None;
    }
    let percent = ((num * 100 + den / 2) / den).min(100) as u8;
    Some(Quality::Percent(percent))
}

fn parse_security(line: &str) -> Option<Security> {
    if !line.contains("IE:") {
        return None;
    }
    if line.contains("WPA3") {
        Some(Security::Wpa3)
    } else if line.contains("WPA2") {
        Some(Security::Wpa2)
    } else if line.contains("WPA") {
        Some(Security::Wpa)
    } else {
        None
    }
}

/// Full marker-based parse of `iwlist <iface> scan` output.
///
/// Duplicate SSIDs collapse to the first occurrence; records that never
/// acquired a name are dropped.
pub fn parse_scan_output(raw: &str) -> Vec<NetworkRecord> {
    let mut networks = Vec::new();
    let mut current = PartialRecord::default();

    for line in raw.lines() {
        let line = line.trim();

        if line.starts_with("Cell ") {
            if let Some(record) = std::mem::take(&mut current).finish() {
                networks.push(record);
            }
            continue;
        }

        if line.contains("ESSID:") {
            if let Some(ssid) = parse_essid(line) {
                current.ssid = Some(ssid);
            }
        } else if line.contains("Quality=") {
            if let Some(quality) = parse_quality(line) {
                current.quality = Some(quality);
            }
        } else if line.contains("Encryption key:") {
            current.encrypted = Some(line.contains("on"));
        } else if let Some(security) = parse_security(line) {
            let stronger = security_rank(security)
                > current.security.map(security_rank).unwrap_or(0);
            if stronger {
                current.security = Some(security);
            }
        }
    }

    if let Some(record) = current.finish() {
        networks.push(record);
    }

    dedup_by_ssid(networks)
}

/// Degraded parse used when the scan tool fails: bare network names only,
/// marked encrypted so the UI prompts for a password rather than attempting
/// an open join.
pub fn parse_scan_fallback(raw: &str) -> Vec<NetworkRecord> {
    let networks = raw
        .lines()
        .filter_map(|line| parse_essid(line.trim()))
        .map(|ssid| NetworkRecord {
            ssid,
            encrypted: true,
            quality: Quality::Unknown,
            security: Security::Unknown,
        })
        .collect();
    dedup_by_ssid(networks)
}

fn dedup_by_ssid(networks: Vec<NetworkRecord>) -> Vec<NetworkRecord> {
    let mut seen = HashSet::new();
    networks
        .into_iter()
        .filter(|n| seen.insert(n.ssid.clone()))
        .collect()
}

// ----------------------------------------------------------------------------
// Operations
// ----------------------------------------------------------------------------

/// Scan for visible networks.
pub async fn scan(config: &HardwareConfig, runner: &dyn ToolRunner) -> Result<Vec<NetworkRecord>> {
    let output = runner
        .run("iwlist", &[&config.wifi_interface, "scan"])
        .await?;

    if output.success {
        let networks = parse_scan_output(&output.stdout);
        debug!(count = networks.len(), "wifi scan parsed");
        Ok(networks)
    } else {
        warn!(detail = %output.detail(), "scan tool failed, using degraded parse");
        Ok(parse_scan_fallback(&output.stdout))
    }
}

/// Connect to `ssid`, supplying `password` for protected networks.
///
/// Both the supplicant start and the DHCP lease must succeed; on any failure
/// the interface is torn back down so no half-configured state survives. The
/// transient credential file never outlives the attempt.
pub async fn connect(
    config: &HardwareConfig,
    runner: &dyn ToolRunner,
    ssid: &str,
    password: Option<&str>,
) -> Result<()> {
    // Tear down whatever supplicant is already attached to the interface.
    let _ = runner.run("killall", &["wpa_supplicant"]).await;

    let credentials = credential_file_contents(ssid, password);
    tokio::fs::write(&config.credentials_path, credentials)
        .await
        .map_err(|err| HardwareError::CredentialFile(err.to_string()))?;

    let outcome = bring_up(config, runner).await;

    if let Err(err) = tokio::fs::remove_file(&config.credentials_path).await {
        warn!(%err, "could not remove transient credential file");
    }

    match outcome {
        Ok(()) => {
            info!(ssid, "wifi connected");
            Ok(())
        }
        Err(err) => {
            // Leave the interface in its pre-attempt state rather than
            // half-configured.
            disconnect(config, runner).await?;
            Err(err)
        }
    }
}

async fn bring_up(config: &HardwareConfig, runner: &dyn ToolRunner) -> Result<()> {
    let credentials_path = config.credentials_path.to_string_lossy().into_owned();

    let output = runner
        .run(
            "wpa_supplicant",
            &["-B", "-i", &config.wifi_interface, "-c", &credentials_path],
        )
        .await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "wpa_supplicant".to_string(),
            detail: output.detail(),
        });
    }

    let output = runner.run("dhclient", &[&config.wifi_interface]).await?;
    if !output.success {
        return Err(HardwareError::ToolFailed {
            tool: "dhclient".to_string(),
            detail: output.detail(),
        });
    }

    Ok(())
}

fn credential_file_contents(ssid: &str, password: Option<&str>) -> String {
    match password {
        Some(psk) => format!(
            "network={{\n    ssid=\"{}\"\n    psk=\"{}\"\n    key_mgmt=WPA-PSK\n}}\n",
            ssid, psk
        ),
        None => format!(
            "network={{\n    ssid=\"{}\"\n    key_mgmt=NONE\n}}\n",
            ssid
        ),
    }
}

/// Drop the supplicant and flush the interface's addresses. Best-effort:
/// nothing to kill is not a failure.
pub async fn disconnect(config: &HardwareConfig, runner: &dyn ToolRunner) -> Result<()> {
    if let Err(err) = runner.run("killall", &["wpa_supplicant"]).await {
        warn!(%err, "supplicant teardown skipped");
    }
    if let Err(err) = runner
        .run("ip", &["addr", "flush", "dev", &config.wifi_interface])
        .await
    {
        warn!(%err, "address flush skipped");
    }
    Ok(())
}

/// Probe the currently associated ESSID via `iwconfig`, if any.
pub async fn current_essid(config: &HardwareConfig, runner: &dyn ToolRunner) -> Option<String> {
    let output = runner
        .run("iwconfig", &[&config.wifi_interface])
        .await
        .ok()?;
    if !output.success {
        return None;
    }
    output.stdout.lines().find_map(|line| parse_essid(line.trim()))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN_FIXTURE: &str = r#"
wlan0     Scan completed :
          Cell 01 - Address: 00:11:22:33:44:55
                    Quality=62/70  Signal level=-48 dBm
                    Encryption key:on
                    ESSID:"Home"
                    IE: IEEE 802.11i/WPA2 Version 1
          Cell 02 - Address: 66:77:88:99:AA:BB
                    Quality=40/70  Signal level=-70 dBm
                    Encryption key:off
                    ESSID:"CoffeeShop"
          Cell 03 - Address: CC:DD:EE:FF:00:11
                    Quality=30/70
                    Encryption key:on
                    ESSID:""
"#;

    #[test]
    fn test_parse_scan_output_basic() {
        let networks = parse_scan_output(SCAN_FIXTURE);
        assert_eq!(networks.len(), 2);

        let home = &networks[0];
        assert_eq!(home.ssid, "Home");
        assert!(home.encrypted);
        assert_eq!(home.quality, Quality::Percent(89));
        assert_eq!(home.security, Security::Wpa2);

        let open = &networks[1];
        assert_eq!(open.ssid, "CoffeeShop");
        assert!(!open.encrypted);
        assert_eq!(open.security, Security::Unknown);
    }

    #[test]
    fn test_duplicate_ssid_collapsed_keep_first() {
        let raw = r#"
          Cell 01 - Address: 00:11:22:33:44:55
                    Quality=62/70
                    Encryption key:on
                    ESSID:"Home"
                    IE: IEEE 802.11i/WPA2 Version 1
          Cell 02 - Address: 66:77:88:99:AA:BB
                    Quality=10/70
                    Encryption key:off
          Cell 03 - Address: 22:22:22:22:22:22
                    Quality=20/70
                    Encryption key:off
                    ESSID:"Home"
"#;
        // Cell 02 never acquires a name; both named cells say "Home".
        let networks = parse_scan_output(raw);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Home");
        // Keep-first means the encrypted WPA2 record wins.
        assert!(networks[0].encrypted);
        assert_eq!(networks[0].security, Security::Wpa2);
    }

    #[test]
    fn test_hidden_and_empty_essids_dropped() {
        let raw = r#"
          Cell 01 - Address: 00:00:00:00:00:01
                    ESSID:""
          Cell 02 - Address: 00:00:00:00:00:02
                    ESSID:"<hidden>"
          Cell 03 - Address: 00:00:00:00:00:03
                    ESSID:"\x00\x00\x00"
          Cell 04 - Address: 00:00:00:00:00:04
                    ESSID:"Visible"
"#;
        let networks = parse_scan_output(raw);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Visible");
    }

    #[test]
    fn test_reordered_fields_still_parse() {
        let raw = r#"
          Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:"Backwards"
                    IE: WPA Version 1
                    Encryption key:on
                    Quality=35/70
"#;
        let networks = parse_scan_output(raw);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].security, Security::Wpa);
        assert_eq!(networks[0].quality, Quality::Percent(50));
    }

    #[test]
    fn test_wpa3_outranks_wpa2() {
        let raw = r#"
          Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:"Modern"
                    IE: IEEE 802.11i/WPA2 Version 1
                    IE: WPA3 SAE
                    Encryption key:on
"#;
        let networks = parse_scan_output(raw);
        assert_eq!(networks[0].security, Security::Wpa3);
    }

    #[test]
    fn test_empty_output_yields_empty_list() {
        assert!(parse_scan_output("").is_empty());
        assert!(parse_scan_fallback("").is_empty());
    }

    #[test]
    fn test_fallback_marks_encrypted() {
        let raw = "garbage\nESSID:\"Rescue\"\nmore garbage\n";
        let networks = parse_scan_fallback(raw);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Rescue");
        assert!(networks[0].encrypted);
        assert_eq!(networks[0].quality, Quality::Unknown);
    }

    #[test]
    fn test_credential_file_shapes() {
        let protected = credential_file_contents("Home", Some("hunter2"));
        assert!(protected.contains("ssid=\"Home\""));
        assert!(protected.contains("psk=\"hunter2\""));
        assert!(protected.contains("key_mgmt=WPA-PSK"));

        let open = credential_file_contents("CoffeeShop", None);
        assert!(open.contains("key_mgmt=NONE"));
        assert!(!open.contains("psk"));
    }
}
