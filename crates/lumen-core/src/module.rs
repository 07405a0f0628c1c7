//! Application module contract
//!
//! Every hosted application implements [`Module`]; the orchestrator never
//! reaches past this trait. Modules are identified by the closed [`ModuleId`]
//! enum so a dangling screen reference is impossible to construct, and the
//! optional hooks carry no-op default bodies so all modules are structurally
//! uniform.

use std::fmt;
use std::time::Instant;

use serde_json::Value;

use crate::input::InputEvent;
use crate::surface::Surface;

// ----------------------------------------------------------------------------
// Module Identity
// ----------------------------------------------------------------------------

/// Identity of a hosted application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Notes,
    Calendar,
    WorldClock,
    Timer,
    SystemInfo,
    Settings,
}

impl ModuleId {
    pub const ALL: [ModuleId; 6] = [
        ModuleId::Notes,
        ModuleId::Calendar,
        ModuleId::WorldClock,
        ModuleId::Timer,
        ModuleId::SystemInfo,
        ModuleId::Settings,
    ];

    /// Stable key under which this module's state lives in the durable
    /// document.
    pub fn key(&self) -> &'static str {
        match self {
            ModuleId::Notes => "Notes",
            ModuleId::Calendar => "Calendar",
            ModuleId::WorldClock => "World Clock",
            ModuleId::Timer => "Timer",
            ModuleId::SystemInfo => "System Info",
            ModuleId::Settings => "Settings",
        }
    }

    /// Human-readable menu title.
    pub fn title(&self) -> &'static str {
        self.key()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

/// Outcome of a module's input handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Keep the module active.
    Stay,
    /// Return to the main menu; the orchestrator exports and persists the
    /// module's state on the way out.
    Back,
}

/// The contract every hosted application satisfies.
///
/// The orchestrator only ever calls these operations; a module's internals
/// are opaque to it. `import_state` must accept absent or partial data
/// (first run, schema drift) by falling back to defaults rather than
/// failing.
pub trait Module: Send {
    fn id(&self) -> ModuleId;

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome;

    /// Per-frame update while this module is active.
    fn tick(&mut self, now: Instant) {
        let _ = now;
    }

    fn render(&self, surface: &mut dyn Surface);

    /// Serialize this module's durable state.
    fn export_state(&self) -> Value;

    /// Restore from a previously exported value. Missing fields take their
    /// defaults; this never panics on malformed input.
    fn import_state(&mut self, state: Value);

    /// Invoked once per menu-to-module transition, before the module becomes
    /// active.
    fn on_enter(&mut self) {}
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
