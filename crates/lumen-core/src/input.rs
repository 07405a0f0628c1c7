//! Input events crossing the raw-input boundary
//!
//! The keyboard backend is an external collaborator; everything it produces
//! is reduced to this closed event set before it reaches the orchestrator.

use std::fmt;

/// A single user input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    /// Enter/select on the current item
    Confirm,
    /// Escape/back out of the current view
    Back,
    /// Printable character, for text entry inside modules
    Char(char),
    Backspace,
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::Up => write!(f, "Up"),
            InputEvent::Down => write!(f, "Down"),
            InputEvent::Left => write!(f, "Left"),
            InputEvent::Right => write!(f, "Right"),
            InputEvent::Confirm => write!(f, "Confirm"),
            InputEvent::Back => write!(f, "Back"),
            InputEvent::Char(c) => write!(f, "Char({})", c),
            InputEvent::Backspace => write!(f, "Backspace"),
        }
    }
}
