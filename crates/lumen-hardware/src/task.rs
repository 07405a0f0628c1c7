//! Hardware task records and scan result types
//!
//! One [`HardwareTask`] snapshot exists per task kind; workers publish a
//! complete record on completion and the UI polls the latest on its tick.
//! Results are overwritten by the next run of the same kind.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// ----------------------------------------------------------------------------
// Task Kinds and Status
// ----------------------------------------------------------------------------

/// The discrete hardware operations, each tracked independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    WifiScan,
    WifiConnect,
    WifiDisconnect,
    BtToggle,
    BtScan,
    BtConnect,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::WifiScan,
        TaskKind::WifiConnect,
        TaskKind::WifiDisconnect,
        TaskKind::BtToggle,
        TaskKind::BtScan,
        TaskKind::BtConnect,
    ];
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::WifiScan => write!(f, "wifi scan"),
            TaskKind::WifiConnect => write!(f, "wifi connect"),
            TaskKind::WifiDisconnect => write!(f, "wifi disconnect"),
            TaskKind::BtToggle => write!(f, "bluetooth power"),
            TaskKind::BtScan => write!(f, "bluetooth scan"),
            TaskKind::BtConnect => write!(f, "bluetooth connect"),
        }
    }
}

/// Lifecycle of one task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

// ----------------------------------------------------------------------------
// Scan Result Types
// ----------------------------------------------------------------------------

/// Signal quality of a scanned network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// 0-100
    Percent(u8),
    Unknown,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Percent(p) => write!(f, "{}%", p),
            Quality::Unknown => write!(f, "?"),
        }
    }
}

/// Security scheme advertised by a scanned network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    Wpa,
    Wpa2,
    Wpa3,
    Unknown,
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Security::Wpa => write!(f, "WPA"),
            Security::Wpa2 => write!(f, "WPA2"),
            Security::Wpa3 => write!(f, "WPA3"),
            Security::Unknown => write!(f, "?"),
        }
    }
}

/// One network seen by a Wi-Fi scan; replaced wholesale on each scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub ssid: String,
    pub encrypted: bool,
    pub quality: Quality,
    pub security: Security,
}

/// One device seen by a Bluetooth scan; replaced wholesale on each scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothDevice {
    pub address: String,
    pub name: String,
}

// ----------------------------------------------------------------------------
// Task Snapshot
// ----------------------------------------------------------------------------

/// Result payload carried by a completed task
#[derive(Debug, Clone, Default)]
pub enum TaskPayload {
    #[default]
    Empty,
    Networks(Vec<NetworkRecord>),
    Devices(Vec<BluetoothDevice>),
}

/// Complete, immutable snapshot of one task kind's latest state.
///
/// Workers build the whole record and publish it in one send, so the UI
/// never observes a half-updated task.
#[derive(Debug, Clone)]
pub struct HardwareTask {
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub payload: TaskPayload,
    /// Epoch milliseconds of the run that produced this snapshot
    pub started_at: u64,
    pub error: Option<String>,
}

impl HardwareTask {
    pub fn idle(kind: TaskKind) -> Self {
        Self {
            kind,
            status: TaskStatus::Idle,
            payload: TaskPayload::Empty,
            started_at: 0,
            error: None,
        }
    }

    pub fn running(kind: TaskKind, started_at: u64) -> Self {
        Self {
            kind,
            status: TaskStatus::Running,
            payload: TaskPayload::Empty,
            started_at,
            error: None,
        }
    }

    pub fn succeeded(kind: TaskKind, started_at: u64, payload: TaskPayload) -> Self {
        Self {
            kind,
            status: TaskStatus::Succeeded,
            payload,
            started_at,
            error: None,
        }
    }

    pub fn failed(kind: TaskKind, started_at: u64, error: impl Into<String>) -> Self {
        Self {
            kind,
            status: TaskStatus::Failed,
            payload: TaskPayload::Empty,
            started_at,
            error: Some(error.into()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }
}

/// Current time as epoch milliseconds, the timestamp convention snapshots use.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_snapshot_shape() {
        let task = HardwareTask::idle(TaskKind::WifiScan);
        assert_eq!(task.status, TaskStatus::Idle);
        assert!(task.error.is_none());
        assert!(matches!(task.payload, TaskPayload::Empty));
    }

    #[test]
    fn test_failed_snapshot_carries_message() {
        let task = HardwareTask::failed(TaskKind::BtConnect, 42, "pairing refused");
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("pairing refused"));
        assert_eq!(task.started_at, 42);
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::WifiScan.to_string(), "wifi scan");
        assert_eq!(TaskKind::BtToggle.to_string(), "bluetooth power");
    }
}
