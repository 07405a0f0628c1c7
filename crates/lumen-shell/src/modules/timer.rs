//! Countdown timer application
//!
//! Hours/minutes/seconds are adjusted in place and persist as
//! `{ "hours", "minutes", "seconds" }`; the running countdown itself is
//! transient. Finishing feeds the notification queue.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumen_core::{InputEvent, InputOutcome, Module, ModuleId, Notifier, Surface, TextStyle};

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

fn default_minutes() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TimerState {
    #[serde(default)]
    hours: u32,
    #[serde(default = "default_minutes")]
    minutes: u32,
    #[serde(default)]
    seconds: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            hours: 0,
            minutes: default_minutes(),
            seconds: 0,
        }
    }
}

pub struct TimerModule {
    hours: u32,
    minutes: u32,
    seconds: u32,
    /// Which of the three fields the arrows adjust
    field: usize,
    remaining: Duration,
    running: bool,
    last_tick: Option<Instant>,
    finished: bool,
    notifier: Notifier,
}

impl TimerModule {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            hours: 0,
            minutes: default_minutes(),
            seconds: 0,
            field: 1,
            remaining: Duration::ZERO,
            running: false,
            last_tick: None,
            finished: false,
            notifier,
        }
    }

    fn configured(&self) -> Duration {
        Duration::from_secs(
            u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds),
        )
    }

    fn adjust(&mut self, delta: i32) {
        let bump = |value: u32, max: u32| -> u32 {
            if delta > 0 {
                (value + 1) % max
            } else {
                (value + max - 1) % max
            }
        };
        match self.field {
            0 => self.hours = bump(self.hours, 24),
            1 => self.minutes = bump(self.minutes, 60),
            _ => self.seconds = bump(self.seconds, 60),
        }
    }

    fn toggle(&mut self, now: Instant) {
        if self.running {
            self.running = false;
            self.last_tick = None;
        } else {
            if self.remaining.is_zero() {
                self.remaining = self.configured();
            }
            if !self.remaining.is_zero() {
                self.running = true;
                self.finished = false;
                self.last_tick = Some(now);
            }
        }
    }

    fn reset(&mut self) {
        self.running = false;
        self.remaining = Duration::ZERO;
        self.last_tick = None;
        self.finished = false;
    }

    fn display_remaining(&self) -> Duration {
        if self.running || !self.remaining.is_zero() {
            self.remaining
        } else {
            self.configured()
        }
    }
}

// ----------------------------------------------------------------------------
// Module Contract
// ----------------------------------------------------------------------------

impl Module for TimerModule {
    fn id(&self) -> ModuleId {
        ModuleId::Timer
    }

    fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Left => self.field = self.field.saturating_sub(1),
            InputEvent::Right => self.field = (self.field + 1).min(2),
            InputEvent::Up => self.adjust(1),
            InputEvent::Down => self.adjust(-1),
            InputEvent::Confirm => self.toggle(Instant::now()),
            InputEvent::Char('r') => self.reset(),
            InputEvent::Back => return InputOutcome::Back,
            _ => {}
        }
        InputOutcome::Stay
    }

    fn tick(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        self.remaining = self.remaining.saturating_sub(elapsed);

        if self.remaining.is_zero() {
            self.running = false;
            self.finished = true;
            self.last_tick = None;
            self.notifier.info("Timer", "Countdown finished");
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "Timer", TextStyle::Title);

        let remaining = self.display_remaining().as_secs();
        let display = format!(
            "{:02}:{:02}:{:02}",
            remaining / 3600,
            (remaining % 3600) / 60,
            remaining % 60
        );
        let style = if self.finished {
            TextStyle::Highlight
        } else {
            TextStyle::Title
        };
        surface.text(2, 3, &display, style);

        let labels = ["hours", "minutes", "seconds"];
        surface.text(2, 5, labels[self.field], TextStyle::Dim);
        if self.finished {
            surface.text(2, 7, "Done!", TextStyle::Highlight);
        }

        surface.text(
            2,
            rows.saturating_sub(1),
            "Arrows adjust  Enter start/pause  r reset  Esc back",
            TextStyle::Dim,
        );
    }

    fn export_state(&self) -> Value {
        serde_json::to_value(TimerState {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        })
        .unwrap_or(Value::Null)
    }

    fn import_state(&mut self, state: Value) {
        let state: TimerState = serde_json::from_value(state).unwrap_or_default();
        self.hours = state.hours.min(23);
        self.minutes = state.minutes.min(59);
        self.seconds = state.seconds.min(59);
        self.reset();
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

    fn module() -> (TimerModule, tokio::sync::mpsc::UnboundedReceiver<lumen_core::Notification>) {
        let (notifier, receiver) = notification_channel();
        (TimerModule::new(notifier), receiver)
    }

    #[test]
    fn test_countdown_finishes_and_notifies() {
        let (mut timer, mut receiver) = module();
        timer.import_state(json!({"hours": 0, "minutes": 0, "seconds": 2}));

        let start = Instant::now();
        timer.toggle(start);
        assert!(timer.running);

        timer.tick(start + Duration::from_secs(1));
        assert!(timer.running);

        timer.tick(start + Duration::from_secs(3));
        assert!(!timer.running);
        assert!(timer.finished);

        let notification = receiver.try_recv().unwrap();
        assert_eq!(notification.title, "Timer");
    }

    #[test]
    fn test_pause_freezes_remaining() {
        let (mut timer, _receiver) = module();
        timer.import_state(json!({"seconds": 30, "minutes": 0}));

        let start = Instant::now();
        timer.toggle(start);
        timer.tick(start + Duration::from_secs(5));
        timer.toggle(start + Duration::from_secs(5)); // pause

        timer.tick(start + Duration::from_secs(60));
        assert_eq!(timer.remaining, Duration::from_secs(25));
    }

    #[test]
    fn test_import_defaults_to_five_minutes() {
        let (mut timer, _receiver) = module();
        timer.import_state(Value::Null);
        assert_eq!(timer.minutes, 5);
        assert_eq!(timer.hours, 0);
    }

    #[test]
    fn test_field_adjust_wraps() {
        let (mut timer, _receiver) = module();
        timer.import_state(json!({"minutes": 0}));
        timer.handle_input(&InputEvent::Down); // minutes 0 -> 59
        assert_eq!(timer.minutes, 59);
    }

    #[test]
    fn test_zero_duration_does_not_start() {
        let (mut timer, _receiver) = module();
        timer.import_state(json!({"hours": 0, "minutes": 0, "seconds": 0}));
        timer.toggle(Instant::now());
        assert!(!timer.running);
    }
}
