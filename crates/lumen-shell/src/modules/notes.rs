//! Notes application
//!
//! List, view, add, and delete short notes. The durable shape is
//! `{ "notes": [{ "title", "body", "created" }] }`.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Surface, TextStyle};

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NotesState {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    View,
    EditTitle,
    EditBody,
}

pub struct NotesModule {
    notes: Vec<Note>,
    selected: usize,
    mode: Mode,
    draft_title: String,
    draft_body: String,
}

impl NotesModule {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            selected: 0,
            mode: Mode::List,
            draft_title: String::new(),
            draft_body: String::new(),
        }
    }

    fn clamp_selection(&mut self) {
        if self.notes.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.notes.len() - 1);
        }
    }

    fn save_draft(&mut self) {
        let title = if self.draft_title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            self.draft_title.trim().to_string()
        };
        self.notes.push(Note {
            title,
            body: self.draft_body.trim().to_string(),
            created: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        });
        self.draft_title.clear();
        self.draft_body.clear();
        self.selected = self.notes.len() - 1;
        self.mode = Mode::List;
    }

    fn handle_list_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Up => self.selected = self.selected.saturating_sub(1),
            InputEvent::Down => {
                if !self.notes.is_empty() {
                    self.selected = (self.selected + 1).min(self.notes.len() - 1);
                }
            }
            InputEvent::Confirm => {
                if !self.notes.is_empty() {
                    self.mode = Mode::View;
                }
            }
            InputEvent::Char('a') => {
                self.mode = Mode::EditTitle;
            }
            InputEvent::Char('d') => {
                if !self.notes.is_empty() {
                    self.notes.remove(self.selected);
                    self.clamp_selection();
                }
            }
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn handle_edit_input(&mut self, event: &InputEvent) {
        let field = match self.mode {
            Mode::EditTitle => &mut self.draft_title,
            _ => &mut self.draft_body,
        };
        match event {
            InputEvent::Char(c) => field.push(*c),
            InputEvent::Backspace => {
                field.pop();
            }
            InputEvent::Confirm => match self.mode {
                Mode::EditTitle => self.mode = Mode::EditBody,
                _ => self.save_draft(),
            },
            InputEvent::Back => {
                self.draft_title.clear();
                self.draft_body.clear();
                self.mode = Mode::List;
            }
            _ => {}
        }
    }
}

impl Default for NotesModule {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

impl Module for NotesModule {
    fn id(&self) -> ModuleId {
        ModuleId::Notes
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match self.mode {
            Mode::List => self.handle_list_input(event),
            Mode::View => {
                if matches!(event, InputEvent::Back | InputEvent::Confirm) {
                    self.mode = Mode::List;
                }
                InputOutcome::Stay
            }
            Mode::EditTitle | Mode::EditBody => {
                self.handle_edit_input(event);
                InputOutcome::Stay
            }
        }
    }

    fn tick(&mut self, _now: Instant) {}

    fn render(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "Notes", TextStyle::Title);

        match self.mode {
            Mode::List => {
                if self.notes.is_empty() {
                    surface.text(2, 2, "No notes yet", TextStyle::Dim);
                }
                for (row, note) in self.notes.iter().enumerate() {
                    let style = if row == self.selected {
                        TextStyle::Highlight
                    } else {
                        TextStyle::Normal
                    };
                    surface.text(2, 2 + row as u16, &note.title, style);
                }
                surface.text(
                    2,
                    rows.saturating_sub(1),
                    "a add  d delete  Enter view  Esc back",
                    TextStyle::Dim,
                );
            }
            Mode::View => {
                if let Some(note) = self.notes.get(self.selected) {
                    surface.text(2, 2, &note.title, TextStyle::Title);
                    surface.text(2, 3, &note.created, TextStyle::Dim);
                    for (row, line) in note.body.lines().enumerate() {
                        surface.text(2, 5 + row as u16, line, TextStyle::Normal);
                    }
                }
            }
            Mode::EditTitle | Mode::EditBody => {
                surface.text(2, 2, "Title:", TextStyle::Dim);
                let title_style = if self.mode == Mode::EditTitle {
                    TextStyle::Highlight
                } else {
                    TextStyle::Normal
                };
                surface.text(9, 2, &self.draft_title, title_style);

                surface.text(2, 4, "Body:", TextStyle::Dim);
                let body_style = if self.mode == Mode::EditBody {
                    TextStyle::Highlight
                } else {
                    TextStyle::Normal
                };
                surface.text(9, 4, &self.draft_body, body_style);

                surface.text(
                    2,
                    rows.saturating_sub(1),
                    "Enter next/save  Esc cancel",
                    TextStyle::Dim,
                );
            }
        }
    }

    fn export_state(&self) -> Value {
        serde_json::to_value(NotesState {
            notes: self.notes.clone(),
        })
        .unwrap_or(Value::Null)
    }

    fn import_state(&mut self, state: Value) {
        let state: NotesState = serde_json::from_value(state).unwrap_or_default();
        self.notes = state.notes;
        self.mode = Mode::List;
        self.clamp_selection();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(module: &mut NotesModule, text: &str) {
        for c in text.chars() {
            module.handle_input(&InputEvent::Char(c));
        }
    }

    #[test]
    fn test_add_note_flow() {
        let mut module = NotesModule::new();
        module.handle_input(&InputEvent::Char('a'));
        typed(&mut module, "Buy milk");
        module.handle_input(&InputEvent::Confirm);
        typed(&mut module, "two liters");
        module.handle_input(&InputEvent::Confirm);

        assert_eq!(module.notes.len(), 1);
        assert_eq!(module.notes[0].title, "Buy milk");
        assert_eq!(module.notes[0].body, "two liters");
        assert!(!module.notes[0].created.is_empty());
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut module = NotesModule::new();
        module.import_state(json!({"notes": [
            {"title": "one"}, {"title": "two"}
        ]}));
        module.handle_input(&InputEvent::Down);
        module.handle_input(&InputEvent::Char('d'));

        assert_eq!(module.notes.len(), 1);
        assert_eq!(module.selected, 0);
    }

    #[test]
    fn test_back_from_list_exits() {
        let mut module = NotesModule::new();
        assert_eq!(module.handle_input(&InputEvent::Back), InputOutcome::Back);
    }

    #[test]
    fn test_back_from_edit_cancels_without_exiting() {
        let mut module = NotesModule::new();
        module.handle_input(&InputEvent::Char('a'));
        typed(&mut module, "draft");
        assert_eq!(module.handle_input(&InputEvent::Back), InputOutcome::Stay);
        assert!(module.notes.is_empty());
        assert!(module.draft_title.is_empty());
    }

    #[test]
    fn test_import_partial_state_takes_defaults() {
        let mut module = NotesModule::new();
        module.import_state(json!({"notes": [{"title": "only title"}]}));
        assert_eq!(module.notes[0].body, "");
        assert_eq!(module.notes[0].created, "");

        module.import_state(Value::Null);
        assert!(module.notes.is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut module = NotesModule::new();
        module.import_state(json!({"notes": [{"title": "a", "body": "b", "created": "c"}]}));
        let exported = module.export_state();

        let mut restored = NotesModule::new();
        restored.import_state(exported.clone());
        assert_eq!(restored.export_state(), exported);
    }
}
