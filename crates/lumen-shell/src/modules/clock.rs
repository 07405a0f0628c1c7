//! World clock application
//!
//! A short list of cities with fixed UTC offsets. State is `{ "zones":
//! [{ "name", "offset_hours" }] }`.

use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Surface, TextStyle};

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub offset_hours: i32,
}

fn default_zones() -> Vec<Zone> {
    vec![
        Zone { name: "London".to_string(), offset_hours: 0 },
        Zone { name: "New York".to_string(), offset_hours: -5 },
        Zone { name: "Tokyo".to_string(), offset_hours: 9 },
        Zone { name: "Sydney".to_string(), offset_hours: 10 },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClockState {
    #[serde(default = "default_zones")]
    zones: Vec<Zone>,
}

impl Default for ClockState {
    fn default() -> Self {
        Self { zones: default_zones() }
    }
}

pub struct WorldClockModule {
    zones: Vec<Zone>,
    selected: usize,
}

impl WorldClockModule {
    pub fn new() -> Self {
        Self {
            zones: default_zones(),
            selected: 0,
        }
    }
}

impl Default for WorldClockModule {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

impl Module for WorldClockModule {
    fn id(&self) -> ModuleId {
        ModuleId::WorldClock
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Up => self.selected = self.selected.saturating_sub(1),
            InputEvent::Down => {
                if !self.zones.is_empty() {
                    self.selected = (self.selected + 1).min(self.zones.len() - 1);
                }
            }
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.text(1, 0, "World Clock", TextStyle::Title);

        let now = Utc::now();
        for (row, zone) in self.zones.iter().enumerate() {
            let local = now + ChronoDuration::hours(zone.offset_hours as i64);
            let line = format!("{:<12} {}", zone.name, local.format("%H:%M"));
            let style = if row == self.selected {
                TextStyle::Highlight
            } else {
                TextStyle::Normal
            };
            surface.text(2, 2 + row as u16, &line, style);
        }
    }

    fn export_state(&self) -> Value {
        serde_json::to_value(ClockState {
            zones: self.zones.clone(),
        })
        .unwrap_or(Value::Null)
    }

    fn import_state(&mut self, state: Value) {
        let state: ClockState = serde_json::from_value(state).unwrap_or_default();
        self.zones = state.zones;
        self.selected = 0;
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_missing_zones_takes_defaults() {
        let mut clock = WorldClockModule::new();
        clock.import_state(Value::Null);
        assert_eq!(clock.zones.len(), 4);
        assert_eq!(clock.zones[0].name, "London");
    }

    #[test]
    fn test_import_custom_zones() {
        let mut clock = WorldClockModule::new();
        clock.import_state(json!({"zones": [{"name": "Lisbon", "offset_hours": 1}]}));
        assert_eq!(clock.zones.len(), 1);
        assert_eq!(clock.zones[0].name, "Lisbon");
    }

    #[test]
    fn test_selection_clamps() {
        let mut clock = WorldClockModule::new();
        for _ in 0..10 {
            clock.handle_input(&InputEvent::Down);
        }
        assert_eq!(clock.selected, 3);
        clock.handle_input(&InputEvent::Up);
        assert_eq!(clock.selected, 2);
    }
}
