//! System information screen
//!
//! Read-only view over the hardware crate's host probes. The probes run on a
//! detached task each time the screen is entered (or refreshed), so the UI
//! never waits on `/proc` or `df`.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Surface, TextStyle};
use lumen_hardware::{sysinfo, SystemReport, ToolRunner};

pub struct SystemInfoModule {
    runner: Arc<dyn ToolRunner>,
    report: watch::Sender<Option<SystemReport>>,
}

impl SystemInfoModule {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            report: watch::channel(None).0,
        }
    }

    fn refresh(&self) {
        let runner = self.runner.clone();
        let report = self.report.clone();
        tokio::spawn(async move {
            let collected = sysinfo::collect(runner.as_ref()).await;
            let _ = report.send(Some(collected));
        });
    }
}

impl Module for SystemInfoModule {
    fn id(&self) -> ModuleId {
        ModuleId::SystemInfo
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Char('r') => self.refresh(),
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn render(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "System Info", TextStyle::Title);

        let report = self.report.borrow().clone();
        let Some(report) = report else {
            surface.text(2, 2, "Collecting...", TextStyle::Dim);
            return;
        };

        let mut row = 2u16;
        let mut line = |surface: &mut dyn Surface, label: &str, value: String| {
            surface.text(2, row, &format!("{:<9} {}", label, value), TextStyle::Normal);
            row += 1;
        };

        if let Some(cpu) = &report.cpu_model {
            line(surface, "CPU", cpu.clone());
        }
        if let Some(memory) = report.memory_total_mb {
            line(surface, "Memory", format!("{} MB", memory));
        }
        if let Some(storage) = &report.storage {
            line(
                surface,
                "Storage",
                format!("{} used of {} ({} free)", storage.used, storage.total, storage.free),
            );
        }
        if let Some(os) = &report.os_name {
            line(surface, "OS", os.clone());
        }
        if let Some(uptime) = &report.uptime {
            line(surface, "Uptime", uptime.clone());
        }

        surface.text(2, rows.saturating_sub(1), "r refresh  Esc back", TextStyle::Dim);
    }

    fn export_state(&self) -> Value {
        // Nothing durable: the report is recollected on entry.
        Value::Null
    }

    fn import_state(&mut self, _state: Value) {}

    fn on_enter(&mut self) {
        self.refresh();
    }
}
