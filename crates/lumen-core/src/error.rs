//! Error types for the Lumen core
//!
//! Per-concern error enums unified by [`CoreError`]. Nothing here is fatal to
//! the shell: store failures degrade to defaults or notifications, and config
//! failures are reported at startup before the UI loop begins.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Errors raised by the persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading error: {0}")]
    Loading(String),

    #[error("configuration validation error: {0}")]
    Validation(String),

    #[error("file system error: {0}")]
    FileSystem(String),
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Core error type for the Lumen kiosk shell
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
