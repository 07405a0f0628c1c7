//! Built-in application modules
//!
//! Each submodule hosts one application behind the `Module` contract.
//! Registration order here is menu order.

pub mod calendar;
pub mod clock;
pub mod notes;
pub mod settings;
pub mod sysinfo;
pub mod timer;

use std::sync::Arc;

use lumen_core::Notifier;
use lumen_hardware::{HardwareEngine, ToolRunner};
use lumen_runtime::ModuleRegistry;

pub use calendar::CalendarModule;
pub use clock::WorldClockModule;
pub use notes::NotesModule;
pub use settings::SettingsModule;
pub use sysinfo::SystemInfoModule;
pub use timer::TimerModule;

/// Build the full registry, handing each module only the collaborators it
/// needs.
pub fn build_registry(
    notifier: &Notifier,
    engine: &HardwareEngine,
    runner: Arc<dyn ToolRunner>,
) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(Box::new(NotesModule::new()));
    registry.register(Box::new(CalendarModule::new(notifier.clone())));
    registry.register(Box::new(WorldClockModule::new()));
    registry.register(Box::new(TimerModule::new(notifier.clone())));
    registry.register(Box::new(SystemInfoModule::new(runner)));
    registry.register(Box::new(SettingsModule::new(engine.clone())));
    registry
}
