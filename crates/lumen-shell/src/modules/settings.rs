//! Settings application
//!
//! Wi-Fi and Bluetooth panels driven entirely by the hardware engine's
//! snapshots: every key that touches the radio fires a request and returns
//! immediately, and the panels redraw from whatever the engine last
//! published. The display panel adjusts the screensaver timeout, which
//! persists as `{ "screensaver_timeout_secs" }` and is applied at the next
//! startup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Surface, TextStyle};
use lumen_hardware::{HardwareEngine, TaskKind, TaskStatus};

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

const CATEGORIES: [&str; 3] = ["Wi-Fi", "Bluetooth", "Display"];

const TIMEOUT_STEP_SECS: u64 = 5;
const TIMEOUT_MIN_SECS: u64 = 10;
const TIMEOUT_MAX_SECS: u64 = 600;

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsState {
    #[serde(default = "default_timeout")]
    screensaver_timeout_secs: u64,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            screensaver_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Categories,
    Wifi,
    Bluetooth,
    Display,
}

/// In-progress password entry for a protected network
struct PasswordEntry {
    ssid: String,
    value: String,
}

pub struct SettingsModule {
    engine: HardwareEngine,
    view: View,
    category_index: usize,
    wifi_index: usize,
    bt_index: usize,
    password: Option<PasswordEntry>,
    screensaver_timeout_secs: u64,
}

impl SettingsModule {
    pub fn new(engine: HardwareEngine) -> Self {
        Self {
            engine,
            view: View::Categories,
            category_index: 0,
            wifi_index: 0,
            bt_index: 0,
            password: None,
            screensaver_timeout_secs: default_timeout(),
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn handle_categories_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Up => self.category_index = self.category_index.saturating_sub(1),
            InputEvent::Down => {
                self.category_index = (self.category_index + 1).min(CATEGORIES.len() - 1)
            }
            InputEvent::Confirm => {
                self.view = match self.category_index {
                    0 => {
                        self.engine.probe_current_network();
                        View::Wifi
                    }
                    1 => View::Bluetooth,
                    _ => View::Display,
                };
            }
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn handle_password_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Char(c) => {
                if let Some(entry) = &mut self.password {
                    entry.value.push(*c);
                }
            }
            InputEvent::Backspace => {
                if let Some(entry) = &mut self.password {
                    entry.value.pop();
                }
            }
            InputEvent::Confirm => {
                if let Some(entry) = self.password.take() {
                    self.engine
                        .request_wifi_connect(entry.ssid, Some(entry.value));
                }
            }
            InputEvent::Back => self.password = None,
            _ => {}
        }
    }

    fn handle_wifi_input(&mut self, event: &InputEvent) {
        if self.password.is_some() {
            self.handle_password_input(event);
            return;
        }

        let networks = self.engine.networks();
        match event {
            InputEvent::Up => self.wifi_index = self.wifi_index.saturating_sub(1),
            InputEvent::Down => {
                if !networks.is_empty() {
                    self.wifi_index = (self.wifi_index + 1).min(networks.len() - 1);
                }
            }
            InputEvent::Char('s') => self.engine.request_wifi_scan(),
            InputEvent::Char('d') => self.engine.request_wifi_disconnect(),
            InputEvent::Confirm => {
                if let Some(network) = networks.get(self.wifi_index) {
                    if network.encrypted {
                        self.password = Some(PasswordEntry {
                            ssid: network.ssid.clone(),
                            value: String::new(),
                        });
                    } else {
                        self.engine.request_wifi_connect(network.ssid.clone(), None);
                    }
                }
            }
            InputEvent::Back => self.view = View::Categories,
            _ => {}
        }
    }

    fn handle_bluetooth_input(&mut self, event: &InputEvent) {
        let devices = self.engine.devices();
        match event {
            InputEvent::Up => self.bt_index = self.bt_index.saturating_sub(1),
            InputEvent::Down => {
                if !devices.is_empty() {
                    self.bt_index = (self.bt_index + 1).min(devices.len() - 1);
                }
            }
            InputEvent::Char('p') => {
                let powered = self.engine.bluetooth_powered();
                self.engine.request_bt_power(!powered);
            }
            InputEvent::Char('s') => self.engine.request_bt_scan(),
            InputEvent::Confirm => {
                if let Some(device) = devices.get(self.bt_index) {
                    self.engine.request_bt_connect(device.address.clone());
                }
            }
            InputEvent::Back => self.view = View::Categories,
            _ => {}
        }
    }

    fn handle_display_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Up => {
                self.screensaver_timeout_secs =
                    (self.screensaver_timeout_secs + TIMEOUT_STEP_SECS).min(TIMEOUT_MAX_SECS)
            }
            InputEvent::Down => {
                self.screensaver_timeout_secs = self
                    .screensaver_timeout_secs
                    .saturating_sub(TIMEOUT_STEP_SECS)
                    .max(TIMEOUT_MIN_SECS)
            }
            InputEvent::Back => self.view = View::Categories,
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------

    fn status_line(&self, kind: TaskKind, busy_label: &str) -> Option<String> {
        let task = self.engine.task(kind);
        match task.status {
            TaskStatus::Running => Some(busy_label.to_string()),
            TaskStatus::Failed => task.error.map(|e| format!("{} failed: {}", kind, e)),
            _ => None,
        }
    }

    fn render_wifi(&self, surface: &mut dyn Surface, rows: u16) {
        match self.engine.current_network() {
            Some(ssid) => surface.text(2, 2, &format!("Connected: {}", ssid), TextStyle::Normal),
            None => surface.text(2, 2, "Not connected", TextStyle::Dim),
        }

        if let Some(entry) = &self.password {
            surface.text(2, 4, &format!("Password for {}:", entry.ssid), TextStyle::Normal);
            let masked = "*".repeat(entry.value.chars().count());
            surface.text(2, 5, &masked, TextStyle::Highlight);
            surface.text(2, rows.saturating_sub(1), "Enter connect  Esc cancel", TextStyle::Dim);
            return;
        }

        let networks = self.engine.networks();
        if networks.is_empty() {
            surface.text(2, 4, "No networks -- press s to scan", TextStyle::Dim);
        }
        for (row, network) in networks.iter().enumerate() {
            let lock = if network.encrypted { "*" } else { " " };
            let line = format!(
                "{} {:<20} {:>4} {}",
                lock, network.ssid, network.quality, network.security
            );
            let style = if row == self.wifi_index {
                TextStyle::Highlight
            } else {
                TextStyle::Normal
            };
            surface.text(2, 4 + row as u16, &line, style);
        }

        let status = self
            .status_line(TaskKind::WifiScan, "Scanning...")
            .or_else(|| self.status_line(TaskKind::WifiConnect, "Connecting..."));
        if let Some(status) = status {
            surface.text(2, rows.saturating_sub(2), &status, TextStyle::Dim);
        }
        surface.text(
            2,
            rows.saturating_sub(1),
            "s scan  Enter connect  d disconnect  Esc back",
            TextStyle::Dim,
        );
    }

    fn render_bluetooth(&self, surface: &mut dyn Surface, rows: u16) {
        let powered = self.engine.bluetooth_powered();
        let power_label = if powered { "Power: on" } else { "Power: off" };
        surface.text(2, 2, power_label, TextStyle::Normal);

        let devices = self.engine.devices();
        if devices.is_empty() {
            surface.text(2, 4, "No devices -- press s to scan", TextStyle::Dim);
        }
        for (row, device) in devices.iter().enumerate() {
            let line = format!("{:<24} {}", device.name, device.address);
            let style = if row == self.bt_index {
                TextStyle::Highlight
            } else {
                TextStyle::Normal
            };
            surface.text(2, 4 + row as u16, &line, style);
        }

        let status = self
            .status_line(TaskKind::BtScan, "Scanning...")
            .or_else(|| self.status_line(TaskKind::BtConnect, "Connecting..."))
            .or_else(|| self.status_line(TaskKind::BtToggle, "Switching power..."));
        if let Some(status) = status {
            surface.text(2, rows.saturating_sub(2), &status, TextStyle::Dim);
        }
        surface.text(
            2,
            rows.saturating_sub(1),
            "p power  s scan  Enter connect  Esc back",
            TextStyle::Dim,
        );
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

impl Module for SettingsModule {
    fn id(&self) -> ModuleId {
        ModuleId::Settings
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match self.view {
            View::Categories => self.handle_categories_input(event),
            View::Wifi => {
                self.handle_wifi_input(event);
                InputOutcome::Stay
            }
            View::Bluetooth => {
                self.handle_bluetooth_input(event);
                InputOutcome::Stay
            }
            View::Display => {
                self.handle_display_input(event);
                InputOutcome::Stay
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "Settings", TextStyle::Title);

        match self.view {
            View::Categories => {
                for (row, category) in CATEGORIES.iter().enumerate() {
                    let style = if row == self.category_index {
                        TextStyle::Highlight
                    } else {
                        TextStyle::Normal
                    };
                    surface.text(2, 2 + row as u16, category, style);
                }
                surface.text(2, rows.saturating_sub(1), "Enter open  Esc back", TextStyle::Dim);
            }
            View::Wifi => self.render_wifi(surface, rows),
            View::Bluetooth => self.render_bluetooth(surface, rows),
            View::Display => {
                let line = format!("Screensaver timeout: {}s", self.screensaver_timeout_secs);
                surface.text(2, 2, &line, TextStyle::Highlight);
                surface.text(2, 4, "Takes effect on next start", TextStyle::Dim);
                surface.text(
                    2,
                    rows.saturating_sub(1),
                    "Up/Down adjust  Esc back",
                    TextStyle::Dim,
                );
            }
        }
    }

    fn export_state(&self) -> Value {
        serde_json::to_value(SettingsState {
            screensaver_timeout_secs: self.screensaver_timeout_secs,
        })
        .unwrap_or(Value::Null)
    }

    fn import_state(&mut self, state: Value) {
        let state: SettingsState = serde_json::from_value(state).unwrap_or_default();
        self.screensaver_timeout_secs = state
            .screensaver_timeout_secs
            .clamp(TIMEOUT_MIN_SECS, TIMEOUT_MAX_SECS);
        self.view = View::Categories;
        self.password = None;
    }

    fn on_enter(&mut self) {
        self.engine.probe_current_network();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
