//! Error types for the hardware connectivity engine
//!
//! Every failure here ends up as a `failed` task snapshot with a short
//! human-readable message; nothing propagates far enough to take the UI down.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors raised while driving the external network tools
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("{tool} timed out after {duration_ms}ms")]
    Timeout { tool: String, duration_ms: u64 },

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("credential file error: {0}")]
    CredentialFile(String),

    #[error("bluetooth is powered off")]
    BluetoothOff,
}

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Cap a tool's stderr/stdout to something a small screen can show.
pub(crate) fn truncate_detail(detail: &str, max_chars: usize) -> String {
    let trimmed = detail.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_detail_caps_long_messages() {
        let long = "x".repeat(500);
        let truncated = truncate_detail(&long, 120);
        assert_eq!(truncated.chars().count(), 123);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_detail_leaves_short_messages() {
        assert_eq!(truncate_detail("  device busy \n", 120), "device busy");
    }
}
