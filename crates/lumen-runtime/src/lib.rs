//! Screen/module orchestrator for the Lumen kiosk shell
//!
//! - [`screen`] - the tagged screen state
//! - [`menu`] - main-menu selection and pagination
//! - [`registry`] - the startup-built module registry
//! - [`orchestrator`] - input/tick/render routing, screensaver forcing,
//!   panic-guarded module calls, save/load coordination
//! - [`background`] - the once-per-minute due-event worker

pub mod background;
pub mod menu;
pub mod orchestrator;
pub mod registry;
pub mod screen;

pub use background::spawn_due_event_worker;
pub use menu::MenuState;
pub use orchestrator::Orchestrator;
pub use registry::ModuleRegistry;
pub use screen::ScreenState;
