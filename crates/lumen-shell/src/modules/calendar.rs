//! Calendar application
//!
//! Day-by-day navigation with per-day events. Events persist as
//! `{ "events": { "YYYY-MM-DD": [{ "time", "title" }] }, "view_date" }`; the
//! background due-event worker reads the same shape to fire notifications,
//! and an event added for the current minute notifies immediately.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Notifier, Surface, TextStyle};

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CalendarState {
    #[serde(default)]
    events: BTreeMap<String, Vec<CalendarEvent>>,
    #[serde(default)]
    view_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    AddTime,
    AddTitle,
}

pub struct CalendarModule {
    events: BTreeMap<String, Vec<CalendarEvent>>,
    view_date: NaiveDate,
    mode: Mode,
    draft_time: String,
    draft_title: String,
    notifier: Notifier,
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl CalendarModule {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            events: BTreeMap::new(),
            view_date: Local::now().date_naive(),
            mode: Mode::Browse,
            draft_time: String::new(),
            draft_title: String::new(),
            notifier,
        }
    }

    fn shift_days(&mut self, days: i64) {
        if let Some(date) = self.view_date.checked_add_signed(ChronoDuration::days(days)) {
            self.view_date = date;
        }
    }

    fn commit_draft(&mut self) {
        let time = self.draft_time.trim().to_string();
        let title = self.draft_title.trim().to_string();
        self.draft_time.clear();
        self.draft_title.clear();
        self.mode = Mode::Browse;
        if title.is_empty() {
            return;
        }

        let key = date_key(self.view_date);
        self.events
            .entry(key.clone())
            .or_default()
            .push(CalendarEvent {
                time: time.clone(),
                title: title.clone(),
            });

        // An event set for right now should not wait for the next background
        // pass.
        let now = Local::now();
        if key == date_key(now.date_naive()) && time == now.format("%I:%M %p").to_string() {
            self.notifier
                .event("Calendar Event", format!("{} at {}", title, time));
        }
    }

    fn handle_browse_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Left => self.shift_days(-1),
            InputEvent::Right => self.shift_days(1),
            InputEvent::Up => self.shift_days(-7),
            InputEvent::Down => self.shift_days(7),
            InputEvent::Confirm => self.mode = Mode::AddTime,
            InputEvent::Char('d') => {
                // Drop the day's most recent event.
                let key = date_key(self.view_date);
                if let Some(day) = self.events.get_mut(&key) {
                    day.pop();
                    if day.is_empty() {
                        self.events.remove(&key);
                    }
                }
            }
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn handle_draft_input(&mut self, event: &InputEvent) {
        let field = match self.mode {
            Mode::AddTime => &mut self.draft_time,
            _ => &mut self.draft_title,
        };
        match event {
            InputEvent::Char(c) => field.push(*c),
            InputEvent::Backspace => {
                field.pop();
            }
            InputEvent::Confirm => match self.mode {
                Mode::AddTime => self.mode = Mode::AddTitle,
                _ => self.commit_draft(),
            },
            InputEvent::Back => {
                self.draft_time.clear();
                self.draft_title.clear();
                self.mode = Mode::Browse;
            }
            _ => {}
        }
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

impl Module for CalendarModule {
    fn id(&self) -> ModuleId {
        ModuleId::Calendar
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match self.mode {
            Mode::Browse => self.handle_browse_input(event),
            Mode::AddTime | Mode::AddTitle => {
                self.handle_draft_input(event);
                InputOutcome::Stay
            }
        }
    }

    fn tick(&mut self, _now: Instant) {}

    fn render(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "Calendar", TextStyle::Title);

        let header = self.view_date.format("%A, %B %d, %Y").to_string();
        surface.text(2, 2, &header, TextStyle::Highlight);

        let today = Local::now().date_naive();
        if self.view_date == today {
            surface.text(2, 3, "today", TextStyle::Dim);
        }

        match self.mode {
            Mode::Browse => {
                let key = date_key(self.view_date);
                match self.events.get(&key) {
                    Some(day) if !day.is_empty() => {
                        for (row, event) in day.iter().enumerate() {
                            let line = if event.time.is_empty() {
                                event.title.clone()
                            } else {
                                format!("{}  {}", event.time, event.title)
                            };
                            surface.text(2, 5 + row as u16, &line, TextStyle::Normal);
                        }
                    }
                    _ => surface.text(2, 5, "No events", TextStyle::Dim),
                }
                surface.text(
                    2,
                    rows.saturating_sub(1),
                    "Arrows move  Enter add  d delete  Esc back",
                    TextStyle::Dim,
                );
            }
            Mode::AddTime | Mode::AddTitle => {
                surface.text(2, 5, "Time (e.g. 07:30 AM):", TextStyle::Dim);
                let time_style = if self.mode == Mode::AddTime {
                    TextStyle::Highlight
                } else {
                    TextStyle::Normal
                };
                surface.text(24, 5, &self.draft_time, time_style);

                surface.text(2, 7, "Title:", TextStyle::Dim);
                let title_style = if self.mode == Mode::AddTitle {
                    TextStyle::Highlight
                } else {
                    TextStyle::Normal
                };
                surface.text(24, 7, &self.draft_title, title_style);
            }
        }
    }

    fn export_state(&self) -> Value {
        serde_json::to_value(CalendarState {
            events: self.events.clone(),
            view_date: Some(date_key(self.view_date)),
        })
        .unwrap_or(Value::Null)
    }

    fn import_state(&mut self, state: Value) {
        let state: CalendarState = serde_json::from_value(state).unwrap_or_default();
        self.events = state.events;
        self.view_date = state
            .view_date
            .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive());
        self.mode = Mode::Browse;
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::notification_channel;
    use serde_json::json;

    fn module() -> CalendarModule {
        let (notifier, _receiver) = notification_channel();
        CalendarModule::new(notifier)
    }

    fn typed(module: &mut CalendarModule, text: &str) {
        for c in text.chars() {
            module.handle_input(&InputEvent::Char(c));
        }
    }

    #[test]
    fn test_add_event_lands_on_viewed_day() {
        let mut cal = module();
        cal.view_date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        cal.handle_input(&InputEvent::Confirm);
        typed(&mut cal, "07:30 AM");
        cal.handle_input(&InputEvent::Confirm);
        typed(&mut cal, "Standup");
        cal.handle_input(&InputEvent::Confirm);

        let day = cal.events.get("2026-08-06").unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].title, "Standup");
        assert_eq!(day[0].time, "07:30 AM");
    }

    #[test]
    fn test_day_navigation_crosses_month_boundary() {
        let mut cal = module();
        cal.view_date = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        cal.handle_input(&InputEvent::Right);
        assert_eq!(cal.view_date, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());

        cal.handle_input(&InputEvent::Up);
        assert_eq!(cal.view_date, NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
    }

    #[test]
    fn test_empty_title_is_not_committed() {
        let mut cal = module();
        cal.handle_input(&InputEvent::Confirm);
        cal.handle_input(&InputEvent::Confirm); // empty time -> title
        cal.handle_input(&InputEvent::Confirm); // empty title -> discarded
        assert!(cal.events.is_empty());
    }

    #[test]
    fn test_import_bad_view_date_falls_back_to_today() {
        let mut cal = module();
        cal.import_state(json!({"view_date": "not-a-date"}));
        assert_eq!(cal.view_date, Local::now().date_naive());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut cal = module();
        cal.import_state(json!({
            "events": {"2026-08-06": [{"time": "07:30 AM", "title": "Standup"}]},
            "view_date": "2026-08-06"
        }));
        let exported = cal.export_state();

        let mut restored = module();
        restored.import_state(exported.clone());
        assert_eq!(restored.export_state(), exported);
    }
}
