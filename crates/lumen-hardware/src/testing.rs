//! Test doubles for the engine's tool boundary
//!
//! [`FakeToolRunner`] stands in for the platform tools the way stub
//! transports stand in for radios: responses are scripted per tool, every
//! invocation is recorded, and an optional delay simulates a slow tool for
//! single-flight tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::tool::{ToolOutput, ToolRunner};

/// Scripted, recording tool runner.
///
/// Responses are keyed by `"program subcommand"` (e.g. `"bluetoothctl
/// pair"`) with a fallback to the bare program name; any invocation without
/// a scripted response succeeds with empty output.
#[derive(Default)]
pub struct FakeToolRunner {
    responses: Mutex<HashMap<String, VecDeque<Result<ToolOutput>>>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every invocation, so a task can be observed mid-flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a successful invocation with the given stdout.
    pub fn ok(self, key: &str, stdout: &str) -> Self {
        self.push(
            key,
            Ok(ToolOutput {
                success: true,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        )
    }

    /// Script a non-zero exit with the given stderr.
    pub fn fail(self, key: &str, stderr: &str) -> Self {
        self.push(
            key,
            Ok(ToolOutput {
                success: false,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        )
    }

    /// Script a runner-level error (tool missing, timeout).
    pub fn err(self, key: &str, error: crate::error::HardwareError) -> Self {
        self.push(key, Err(error))
    }

    fn push(self, key: &str, response: Result<ToolOutput>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every invocation so far, as `"program arg1 arg2 ..."` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRunner for FakeToolRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput> {
        let call = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };
        self.calls.lock().unwrap().push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let subcommand_key = args
            .first()
            .map(|arg| format!("{} {}", program, arg))
            .unwrap_or_else(|| program.to_string());

        let mut responses = self.responses.lock().unwrap();
        let key = if responses.get(&subcommand_key).is_some_and(|q| !q.is_empty()) {
            Some(subcommand_key)
        } else if responses.get(program).is_some_and(|q| !q.is_empty()) {
            Some(program.to_string())
        } else {
            None
        };

        match key.and_then(|k| responses.get_mut(&k)?.pop_front()) {
            Some(response) => response,
            None => Ok(ToolOutput {
                success: true,
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}
