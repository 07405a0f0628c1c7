//! Core types and leaf subsystems for the Lumen kiosk shell
//!
//! This crate holds everything the rest of the workspace agrees on:
//!
//! - [`module`] - the application module contract and the closed module
//!   identity enum
//! - [`input`] - the input-event boundary
//! - [`surface`] - the render-surface boundary
//! - [`notify`] - the bounded, fading notification queue and its publishing
//!   handle
//! - [`store`] - the durable per-module state document
//! - [`config`] - kiosk runtime configuration
//! - [`error`] - error types
//!
//! The orchestrator lives in `lumen-runtime`, the connectivity engine in
//! `lumen-hardware`, and the binary plus the built-in applications in
//! `lumen-shell`.

pub mod config;
pub mod error;
pub mod input;
pub mod module;
pub mod notify;
pub mod store;
pub mod surface;

pub use config::KioskConfig;
pub use error::{ConfigError, CoreError, Result, StoreError};
pub use input::InputEvent;
pub use module::{InputOutcome, Module, ModuleId};
pub use notify::{notification_channel, Category, Notification, NotificationQueue, Notifier};
pub use store::{PersistedBlob, PersistentStore};
pub use surface::{NotificationView, Surface, TextStyle};
