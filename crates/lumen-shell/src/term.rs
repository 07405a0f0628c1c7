//! Terminal rendering and input mapping
//!
//! The thin concrete end of the rendering/input boundary: a crossterm-backed
//! [`Surface`] and the keyboard-to-[`InputEvent`] mapping. Deliberately
//! small; everything interesting happens behind the `Surface` trait.

use std::io::{self, Stdout, Write};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};

use lumen_core::{Category, InputEvent, NotificationView, Surface, TextStyle};

// ----------------------------------------------------------------------------
// Terminal Surface
// ----------------------------------------------------------------------------

pub struct TermSurface {
    out: Stdout,
    size: (u16, u16),
}

impl TermSurface {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        let size = crossterm::terminal::size().unwrap_or((80, 24));
        Ok(Self { out, size })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Drop for TermSurface {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        let _ = disable_raw_mode();
    }
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Info => Color::Cyan,
        Category::Success => Color::Green,
        Category::Warning => Color::Yellow,
        Category::Error => Color::Red,
        Category::Event => Color::Magenta,
    }
}

impl Surface for TermSurface {
    fn clear(&mut self) {
        self.size = crossterm::terminal::size().unwrap_or(self.size);
        let _ = queue!(self.out, Clear(ClearType::All));
    }

    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn text(&mut self, col: u16, row: u16, text: &str, style: TextStyle) {
        let attribute = match style {
            TextStyle::Normal => Attribute::Reset,
            TextStyle::Highlight => Attribute::Reverse,
            TextStyle::Dim => Attribute::Dim,
            TextStyle::Title => Attribute::Bold,
        };
        let _ = queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetAttribute(attribute),
            Print(text),
            SetAttribute(Attribute::Reset),
        );
    }

    fn notification(&mut self, slot: usize, view: &NotificationView<'_>) {
        let (cols, _) = self.size;
        let line = format!("[{}] {}", view.title, view.message);
        let col = cols.saturating_sub(line.chars().count() as u16 + 1);

        let _ = queue!(
            self.out,
            cursor::MoveTo(col, slot as u16),
            SetForegroundColor(category_color(view.category)),
        );
        // No alpha blending in a terminal: fading notifications dim instead.
        if view.opacity < 0.5 {
            let _ = queue!(self.out, SetAttribute(Attribute::Dim));
        }
        let _ = queue!(
            self.out,
            Print(line),
            SetAttribute(Attribute::Reset),
            ResetColor,
        );
    }
}

// ----------------------------------------------------------------------------
// Input Mapping
// ----------------------------------------------------------------------------

/// Map a terminal key event onto the kiosk's input set. Key releases and
/// unbound keys map to nothing.
pub fn map_key(event: &KeyEvent) -> Option<InputEvent> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::Left => Some(InputEvent::Left),
        KeyCode::Right => Some(InputEvent::Right),
        KeyCode::Enter => Some(InputEvent::Confirm),
        KeyCode::Esc => Some(InputEvent::Back),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_navigation_keys_map() {
        assert_eq!(map_key(&press(KeyCode::Up)), Some(InputEvent::Up));
        assert_eq!(map_key(&press(KeyCode::Enter)), Some(InputEvent::Confirm));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(InputEvent::Back));
        assert_eq!(map_key(&press(KeyCode::Char('a'))), Some(InputEvent::Char('a')));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut event = press(KeyCode::Up);
        event.kind = KeyEventKind::Release;
        assert_eq!(map_key(&event), None);
    }

    #[test]
    fn test_unbound_keys_ignored() {
        assert_eq!(map_key(&press(KeyCode::F(5))), None);
    }
}
