//! Screen state

use std::time::Instant;

use lumen_core::ModuleId;

/// Which screen owns input and rendering right now. Exactly one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    MainMenu,
    ActiveModule(ModuleId),
    Screensaver { since: Instant },
}

impl ScreenState {
    pub fn is_screensaver(&self) -> bool {
        matches!(self, ScreenState::Screensaver { .. })
    }
}
