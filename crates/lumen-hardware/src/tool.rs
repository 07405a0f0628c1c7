//! External-tool execution seam
//!
//! All hardware operations shell out to platform tools (`iwlist`,
//! `wpa_supplicant`, `dhclient`, `bluetoothctl`, ...). [`ToolRunner`] is the
//! trait boundary between the engine's logic and those processes: production
//! uses [`SystemToolRunner`], tests inject scripted fakes and never spawn
//! anything.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{truncate_detail, HardwareError, Result};

/// Longest tool detail message surfaced to the UI
const DETAIL_LIMIT: usize = 120;

// ----------------------------------------------------------------------------
// Tool Runner Trait
// ----------------------------------------------------------------------------

/// Captured output of one tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the process exited zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Short failure detail, preferring stderr over stdout.
    pub fn detail(&self) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        truncate_detail(source, DETAIL_LIMIT)
    }
}

/// Executes external tools on behalf of the engine's workers.
///
/// Implementations must bound every invocation: a hung tool surfaces as
/// [`HardwareError::Timeout`], never as a stuck worker.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput>;
}

// ----------------------------------------------------------------------------
// System Implementation
// ----------------------------------------------------------------------------

/// Real subprocess-backed runner
#[derive(Debug, Clone)]
pub struct SystemToolRunner {
    timeout: Duration,
}

impl SystemToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput> {
        debug!(tool = program, ?args, "invoking external tool");

        let invocation = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, invocation).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(HardwareError::ToolUnavailable {
                    tool: program.to_string(),
                    reason: "not found".to_string(),
                });
            }
            Ok(Err(err)) => {
                return Err(HardwareError::ToolUnavailable {
                    tool: program.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(_) => {
                return Err(HardwareError::Timeout {
                    tool: program.to_string(),
                    duration_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_runner_captures_stdout() {
        let runner = SystemToolRunner::new(Duration::from_secs(5));
        let output = runner.run("echo", &["hello"]).await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_missing_tool_is_unavailable() {
        let runner = SystemToolRunner::new(Duration::from_secs(5));
        let err = runner
            .run("definitely-not-a-real-tool-xyz", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HardwareError::ToolUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_hung_tool_times_out() {
        let runner = SystemToolRunner::new(Duration::from_millis(50));
        let err = runner.run("sleep", &["5"]).await.unwrap_err();
        assert!(matches!(err, HardwareError::Timeout { .. }));
    }

    #[test]
    fn test_detail_prefers_stderr() {
        let output = ToolOutput {
            success: false,
            stdout: "noise".to_string(),
            stderr: "actual problem".to_string(),
        };
        assert_eq!(output.detail(), "actual problem");
    }
}
