//! Hardware connectivity engine
//!
//! One [`HardwareEngine`] owns a single-slot `watch` channel per task kind.
//! A request marks the slot `running` and spawns a detached worker; the
//! worker publishes one complete [`HardwareTask`] snapshot when it finishes.
//! The UI never blocks on any of this: it polls the latest snapshots on its
//! normal tick cadence.
//!
//! Single-flight is enforced at the slot: marking a slot `running` is an
//! atomic check-and-set, so a second request of the same kind while one is
//! in flight is a no-op and the in-flight task's `started_at` is never
//! disturbed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bluetooth;
use crate::config::HardwareConfig;
use crate::error::HardwareError;
use crate::task::{
    epoch_millis, BluetoothDevice, HardwareTask, NetworkRecord, TaskKind, TaskPayload, TaskStatus,
};
use crate::tool::{SystemToolRunner, ToolRunner};
use crate::wifi;

// ----------------------------------------------------------------------------
// Engine
// ----------------------------------------------------------------------------

struct EngineShared {
    config: HardwareConfig,
    runner: Arc<dyn ToolRunner>,
    slots: HashMap<TaskKind, watch::Sender<HardwareTask>>,
    current_network: watch::Sender<Option<String>>,
    bluetooth_powered: watch::Sender<bool>,
}

impl EngineShared {
    fn slot(&self, kind: TaskKind) -> &watch::Sender<HardwareTask> {
        // The map is built over TaskKind::ALL at construction.
        &self.slots[&kind]
    }

    /// Atomically move a slot to `running`. Returns the run's `started_at`
    /// timestamp, or `None` if a task of this kind is already in flight.
    fn begin(&self, kind: TaskKind) -> Option<u64> {
        let started_at = epoch_millis();
        let mut begun = false;
        self.slot(kind).send_if_modified(|task| {
            if task.is_running() {
                return false;
            }
            *task = HardwareTask::running(kind, started_at);
            begun = true;
            true
        });
        if !begun {
            debug!(%kind, "request ignored, task already running");
        }
        begun.then_some(started_at)
    }

    fn publish(&self, task: HardwareTask) {
        self.slot(task.kind).send_replace(task);
    }
}

/// Cloneable handle to the connectivity engine.
///
/// Requests return immediately; results arrive in the per-kind snapshots.
#[derive(Clone)]
pub struct HardwareEngine {
    shared: Arc<EngineShared>,
}

impl HardwareEngine {
    pub fn new(config: HardwareConfig, runner: Arc<dyn ToolRunner>) -> Self {
        let slots = TaskKind::ALL
            .into_iter()
            .map(|kind| (kind, watch::channel(HardwareTask::idle(kind)).0))
            .collect();

        Self {
            shared: Arc::new(EngineShared {
                config,
                runner,
                slots,
                current_network: watch::channel(None).0,
                bluetooth_powered: watch::channel(false).0,
            }),
        }
    }

    /// Engine backed by the real platform tools.
    pub fn with_system_tools(config: HardwareConfig) -> Self {
        let runner = Arc::new(SystemToolRunner::new(config.tool_timeout()));
        Self::new(config, runner)
    }

    // ------------------------------------------------------------------
    // Snapshot access (UI side)
    // ------------------------------------------------------------------

    /// Latest snapshot for a task kind.
    pub fn task(&self, kind: TaskKind) -> HardwareTask {
        self.shared.slot(kind).borrow().clone()
    }

    /// Watch a task kind's snapshot slot directly.
    pub fn subscribe(&self, kind: TaskKind) -> watch::Receiver<HardwareTask> {
        self.shared.slot(kind).subscribe()
    }

    /// Networks from the most recent completed Wi-Fi scan.
    pub fn networks(&self) -> Vec<NetworkRecord> {
        match &self.task(TaskKind::WifiScan).payload {
            TaskPayload::Networks(networks) => networks.clone(),
            _ => Vec::new(),
        }
    }

    /// Devices from the most recent completed Bluetooth scan.
    pub fn devices(&self) -> Vec<BluetoothDevice> {
        match &self.task(TaskKind::BtScan).payload {
            TaskPayload::Devices(devices) => devices.clone(),
            _ => Vec::new(),
        }
    }

    /// SSID the interface is currently attached to, if any.
    pub fn current_network(&self) -> Option<String> {
        self.shared.current_network.borrow().clone()
    }

    pub fn bluetooth_powered(&self) -> bool {
        *self.shared.bluetooth_powered.borrow()
    }

    // ------------------------------------------------------------------
    // Requests (one worker per in-flight kind)
    // ------------------------------------------------------------------

    /// Scan for visible Wi-Fi networks.
    pub fn request_wifi_scan(&self) {
        let Some(started_at) = self.shared.begin(TaskKind::WifiScan) else {
            return;
        };
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let task = match wifi::scan(&shared.config, shared.runner.as_ref()).await {
                Ok(networks) => {
                    info!(count = networks.len(), "wifi scan finished");
                    HardwareTask::succeeded(
                        TaskKind::WifiScan,
                        started_at,
                        TaskPayload::Networks(networks),
                    )
                }
                Err(err) => {
                    warn!(%err, "wifi scan failed");
                    HardwareTask::failed(TaskKind::WifiScan, started_at, err.to_string())
                }
            };
            shared.publish(task);
        });
    }

    /// Connect to a network. A failure at any step leaves the interface
    /// fully disconnected and the current-network slot unset.
    pub fn request_wifi_connect(&self, ssid: impl Into<String>, password: Option<String>) {
        let Some(started_at) = self.shared.begin(TaskKind::WifiConnect) else {
            return;
        };
        let ssid = ssid.into();
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let outcome = wifi::connect(
                &shared.config,
                shared.runner.as_ref(),
                &ssid,
                password.as_deref(),
            )
            .await;

            let task = match outcome {
                Ok(()) => {
                    shared.current_network.send_replace(Some(ssid.clone()));
                    HardwareTask::succeeded(TaskKind::WifiConnect, started_at, TaskPayload::Empty)
                }
                Err(err) => {
                    warn!(ssid, %err, "wifi connect failed");
                    shared.current_network.send_replace(None);
                    HardwareTask::failed(TaskKind::WifiConnect, started_at, err.to_string())
                }
            };
            shared.publish(task);
        });
    }

    /// Tear down the current Wi-Fi association. Best-effort.
    pub fn request_wifi_disconnect(&self) {
        let Some(started_at) = self.shared.begin(TaskKind::WifiDisconnect) else {
            return;
        };
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let task = match wifi::disconnect(&shared.config, shared.runner.as_ref()).await {
                Ok(()) => {
                    shared.current_network.send_replace(None);
                    HardwareTask::succeeded(
                        TaskKind::WifiDisconnect,
                        started_at,
                        TaskPayload::Empty,
                    )
                }
                Err(err) => HardwareTask::failed(TaskKind::WifiDisconnect, started_at, err.to_string()),
            };
            shared.publish(task);
        });
    }

    /// Probe the interface for its current association and refresh the
    /// current-network slot. Not a tracked task; used when the settings
    /// screen comes up.
    pub fn probe_current_network(&self) {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let essid = wifi::current_essid(&shared.config, shared.runner.as_ref()).await;
            shared.current_network.send_replace(essid);
        });
    }

    /// Switch Bluetooth power on or off.
    pub fn request_bt_power(&self, on: bool) {
        let Some(started_at) = self.shared.begin(TaskKind::BtToggle) else {
            return;
        };
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let task = match bluetooth::set_power(shared.runner.as_ref(), on).await {
                Ok(()) => {
                    shared.bluetooth_powered.send_replace(on);
                    HardwareTask::succeeded(TaskKind::BtToggle, started_at, TaskPayload::Empty)
                }
                Err(err) => {
                    warn!(%err, "bluetooth power toggle failed");
                    HardwareTask::failed(TaskKind::BtToggle, started_at, err.to_string())
                }
            };
            shared.publish(task);
        });
    }

    /// Discover nearby Bluetooth devices. Rejected while the radio is off.
    pub fn request_bt_scan(&self) {
        if !self.bluetooth_powered() {
            self.reject_powered_off(TaskKind::BtScan);
            return;
        }
        let Some(started_at) = self.shared.begin(TaskKind::BtScan) else {
            return;
        };
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let settle = shared.config.bluetooth_settle();
            let task = match bluetooth::scan(shared.runner.as_ref(), settle).await {
                Ok(devices) => {
                    info!(count = devices.len(), "bluetooth scan finished");
                    HardwareTask::succeeded(
                        TaskKind::BtScan,
                        started_at,
                        TaskPayload::Devices(devices),
                    )
                }
                Err(err) => {
                    warn!(%err, "bluetooth scan failed");
                    HardwareTask::failed(TaskKind::BtScan, started_at, err.to_string())
                }
            };
            shared.publish(task);
        });
    }

    /// Pair and connect a Bluetooth device. Rejected while the radio is off.
    pub fn request_bt_connect(&self, address: impl Into<String>) {
        if !self.bluetooth_powered() {
            self.reject_powered_off(TaskKind::BtConnect);
            return;
        }
        let Some(started_at) = self.shared.begin(TaskKind::BtConnect) else {
            return;
        };
        let address = address.into();
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let task = match bluetooth::connect(shared.runner.as_ref(), &address).await {
                Ok(()) => {
                    HardwareTask::succeeded(TaskKind::BtConnect, started_at, TaskPayload::Empty)
                }
                Err(err) => {
                    warn!(address, %err, "bluetooth connect failed");
                    HardwareTask::failed(TaskKind::BtConnect, started_at, err.to_string())
                }
            };
            shared.publish(task);
        });
    }

    /// Publish a descriptive rejection instead of silently dropping a
    /// request that needs the radio on.
    fn reject_powered_off(&self, kind: TaskKind) {
        let message = format!(
            "{}: turn bluetooth power on first",
            HardwareError::BluetoothOff
        );
        self.shared
            .publish(HardwareTask::failed(kind, epoch_millis(), message));
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeToolRunner;
    use std::time::Duration;

    async fn wait_terminal(engine: &HardwareEngine, kind: TaskKind) -> HardwareTask {
        let mut receiver = engine.subscribe(kind);
        let task = tokio::time::timeout(
            Duration::from_secs(5),
            receiver.wait_for(|t| {
                matches!(t.status, TaskStatus::Succeeded | TaskStatus::Failed)
            }),
        )
        .await
        .expect("task did not complete in time")
        .expect("snapshot channel closed");
        task.clone()
    }

    fn engine_with(runner: FakeToolRunner) -> (HardwareEngine, Arc<FakeToolRunner>) {
        let runner = Arc::new(runner);
        // No settle window in tests: the fake tool needs no discovery time.
        let mut config = HardwareConfig::default();
        config.bluetooth_settle_secs = 0;
        (HardwareEngine::new(config, runner.clone()), runner)
    }

    #[tokio::test]
    async fn test_scan_publishes_networks() {
        let fixture = "Cell 01 - Address: 00:11:22:33:44:55\n    ESSID:\"Home\"\n    Encryption key:on\n";
        let (engine, _) = engine_with(FakeToolRunner::new().ok("iwlist", fixture));

        engine.request_wifi_scan();
        let task = wait_terminal(&engine, TaskKind::WifiScan).await;

        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(engine.networks().len(), 1);
        assert_eq!(engine.networks()[0].ssid, "Home");
    }

    #[tokio::test]
    async fn test_second_scan_request_is_single_flight() {
        let (engine, runner) = engine_with(
            FakeToolRunner::new()
                .with_delay(Duration::from_millis(100))
                .ok("iwlist", "ESSID:\"Home\"\n"),
        );

        engine.request_wifi_scan();
        let first = engine.task(TaskKind::WifiScan);
        assert!(first.is_running());

        // A second request while the first is in flight is a no-op.
        engine.request_wifi_scan();
        let second = engine.task(TaskKind::WifiScan);
        assert_eq!(second.started_at, first.started_at);

        wait_terminal(&engine, TaskKind::WifiScan).await;
        let scans = runner
            .calls()
            .iter()
            .filter(|call| call.starts_with("iwlist"))
            .count();
        assert_eq!(scans, 1);
    }

    #[tokio::test]
    async fn test_connect_dhcp_failure_leaves_no_partial_state() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = dir.path().join("wpa.conf");

        let runner = Arc::new(
            FakeToolRunner::new()
                .ok("wpa_supplicant", "")
                .fail("dhclient", "no lease"),
        );
        let config = HardwareConfig::default().with_credentials_path(credentials.clone());
        let engine = HardwareEngine::new(config, runner.clone());

        engine.request_wifi_connect("Home", Some("hunter2".to_string()));
        let task = wait_terminal(&engine, TaskKind::WifiConnect).await;

        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().contains("dhclient"));
        assert_eq!(engine.current_network(), None);
        assert!(!credentials.exists(), "credential file must not persist");
        // The failure path tears the interface back down.
        assert!(runner.calls().iter().any(|c| c.starts_with("ip addr flush")));
    }

    #[tokio::test]
    async fn test_connect_success_sets_current_network() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = dir.path().join("wpa.conf");
        let config = HardwareConfig::default().with_credentials_path(credentials.clone());
        let engine = HardwareEngine::new(config, Arc::new(FakeToolRunner::new()));

        engine.request_wifi_connect("Home", Some("hunter2".to_string()));
        let task = wait_terminal(&engine, TaskKind::WifiConnect).await;

        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(engine.current_network().as_deref(), Some("Home"));
        assert!(!credentials.exists());
    }

    #[tokio::test]
    async fn test_bt_scan_rejected_while_powered_off() {
        let (engine, runner) = engine_with(FakeToolRunner::new());

        engine.request_bt_scan();
        let task = engine.task(TaskKind::BtScan);

        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().contains("power"));
        assert!(runner.calls().is_empty(), "no tool may run while powered off");
    }

    #[tokio::test]
    async fn test_bt_pair_failure_short_circuits_connect() {
        let (engine, runner) = engine_with(
            FakeToolRunner::new().fail("bluetoothctl pair", "AuthenticationFailed"),
        );

        engine.request_bt_power(true);
        let power = wait_terminal(&engine, TaskKind::BtToggle).await;
        assert_eq!(power.status, TaskStatus::Succeeded);
        assert!(engine.bluetooth_powered());

        engine.request_bt_connect("AA:BB:CC:DD:EE:FF");
        let task = wait_terminal(&engine, TaskKind::BtConnect).await;

        assert_eq!(task.status, TaskStatus::Failed);
        let calls = runner.calls();
        assert!(calls.iter().any(|c| c.starts_with("bluetoothctl pair")));
        assert!(!calls.iter().any(|c| c.starts_with("bluetoothctl connect")));
    }

    #[tokio::test]
    async fn test_bt_scan_lists_devices_and_stops_discovery() {
        let (engine, runner) = engine_with(
            FakeToolRunner::new()
                .ok("bluetoothctl devices", "Device AA:BB:CC:DD:EE:FF Speaker\n"),
        );

        engine.request_bt_power(true);
        wait_terminal(&engine, TaskKind::BtToggle).await;

        engine.request_bt_scan();
        let task = wait_terminal(&engine, TaskKind::BtScan).await;

        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(engine.devices().len(), 1);
        assert!(runner.calls().iter().any(|c| c == "bluetoothctl scan off"));
    }
}
