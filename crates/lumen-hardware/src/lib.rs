//! Hardware connectivity engine for the Lumen kiosk shell
//!
//! Asynchronous Wi-Fi and Bluetooth management on top of the platform's
//! command-line network tools. The crate is organized as:
//!
//! - [`config`] - engine configuration (interface, timeouts, settle windows)
//! - [`error`] - error types specific to external-tool coordination
//! - [`task`] - task-kind state machine records and scan result types
//! - [`tool`] - the `ToolRunner` seam over subprocess execution
//! - [`wifi`] - Wi-Fi scan/connect/disconnect flows and `iwlist` parsing
//! - [`bluetooth`] - Bluetooth power/scan/connect flows and `bluetoothctl`
//!   parsing
//! - [`sysinfo`] - read-only host probes for the System Info screen
//! - [`engine`] - the engine itself: per-kind snapshot slots, single-flight
//!   workers
//!
//! The UI side holds a cloneable [`HardwareEngine`], fires requests, and
//! polls the resulting [`HardwareTask`] snapshots on its tick. Workers never
//! touch UI state and the UI never blocks on a worker.

pub mod bluetooth;
pub mod config;
pub mod engine;
pub mod error;
pub mod sysinfo;
pub mod task;
pub mod tool;
pub mod wifi;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::HardwareConfig;
pub use engine::HardwareEngine;
pub use error::{HardwareError, Result};
pub use sysinfo::{StorageReport, SystemReport};
pub use task::{
    BluetoothDevice, HardwareTask, NetworkRecord, Quality, Security, TaskKind, TaskPayload,
    TaskStatus,
};
pub use tool::{SystemToolRunner, ToolOutput, ToolRunner};
