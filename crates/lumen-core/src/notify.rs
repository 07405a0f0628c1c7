//! Transient notification subsystem
//!
//! A bounded, time-ordered queue of short-lived messages overlaid on every
//! screen. Modules and background workers never touch the queue directly:
//! they publish through a cloneable [`Notifier`] handle, and the orchestrator
//! drains the channel into its queue once per tick. Notifications expire
//! after their duration and fade linearly over the final second.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

/// Default lifetime of a notification
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// Lifetime of calendar-event notifications
pub const EVENT_DURATION: Duration = Duration::from_secs(30);

/// Window at the end of a notification's life over which it fades out
pub const FADE_WINDOW: Duration = Duration::from_secs(1);

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 3;

// ----------------------------------------------------------------------------
// Notification
// ----------------------------------------------------------------------------

/// Severity/kind of a notification, used by the renderer for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Info,
    Success,
    Warning,
    Error,
    Event,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Info => write!(f, "info"),
            Category::Success => write!(f, "success"),
            Category::Warning => write!(f, "warning"),
            Category::Error => write!(f, "error"),
            Category::Event => write!(f, "event"),
        }
    }
}

/// A single transient message
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub category: Category,
    pub created_at: Instant,
    pub duration: Duration,
    /// Render opacity in `[0.0, 1.0]`, recomputed each tick
    pub opacity: f32,
}

impl Notification {
    /// Create a notification with the default duration for its category
    /// (`event` notifications live longer so a glance can catch them).
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        category: Category,
        created_at: Instant,
    ) -> Self {
        let duration = match category {
            Category::Event => EVENT_DURATION,
            _ => DEFAULT_DURATION,
        };
        Self::with_duration(title, message, category, created_at, duration)
    }

    pub fn with_duration(
        title: impl Into<String>,
        message: impl Into<String>,
        category: Category,
        created_at: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            category,
            created_at,
            duration,
            opacity: 1.0,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.duration
    }

    /// Recompute opacity: full until the fade window, then a linear ramp to
    /// zero over the remaining life.
    fn update_opacity(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.created_at);
        let remaining = self.duration.saturating_sub(elapsed);
        if remaining >= FADE_WINDOW {
            self.opacity = 1.0;
        } else {
            self.opacity = remaining.as_secs_f32() / FADE_WINDOW.as_secs_f32();
        }
    }
}

// ----------------------------------------------------------------------------
// Notification Queue
// ----------------------------------------------------------------------------

/// Bounded, time-ordered collection of pending notifications
#[derive(Debug)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a notification, evicting the oldest entries past capacity.
    pub fn enqueue(&mut self, notification: Notification) {
        self.entries.push_back(notification);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(title = %evicted.title, "notification evicted at capacity");
            }
        }
    }

    /// Drop expired notifications and recompute fade for the survivors.
    pub fn tick(&mut self, now: Instant) {
        self.entries.retain(|n| !n.is_expired(now));
        for notification in &mut self.entries {
            notification.update_opacity(now);
        }
    }

    /// Current notifications, oldest first, for stacked display. Repeated
    /// calls within the same tick return the same sequence.
    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ----------------------------------------------------------------------------
// Notifier Handle
// ----------------------------------------------------------------------------

/// Cloneable publishing handle handed to modules and background workers.
///
/// Sends never block and never fail visibly: once the receiving side is gone
/// the shell is shutting down and pending notifications have nowhere to go.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn send(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }

    pub fn notify(&self, title: impl Into<String>, message: impl Into<String>, category: Category) {
        self.send(Notification::new(title, message, category, Instant::now()));
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(title, message, Category::Info);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(title, message, Category::Success);
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(title, message, Category::Warning);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(title, message, Category::Error);
    }

    pub fn event(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(title, message, Category::Event);
    }
}

/// Create the notifier handle and the receiving end drained by the
/// orchestrator.
pub fn notification_channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Notifier { sender }, receiver)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, created_at: Instant) -> Notification {
        Notification::new(title, "msg", Category::Info, created_at)
    }

    #[test]
    fn test_enqueue_past_capacity_evicts_oldest() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new(3);
        for title in ["a", "b", "c", "d"] {
            queue.enqueue(entry(title, now));
        }

        assert_eq!(queue.len(), 3);
        let titles: Vec<_> = queue.pending().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_expired_notifications_removed_on_tick() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new(3);
        queue.enqueue(entry("short", start));

        queue.tick(start + Duration::from_secs(6));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fade_ramp_over_final_second() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new(3);
        queue.enqueue(entry("fading", start));

        // Well before the fade window: fully opaque.
        queue.tick(start + Duration::from_secs(3));
        let opacity = queue.pending().next().unwrap().opacity;
        assert!((opacity - 1.0).abs() < f32::EPSILON);

        // Halfway through the final second: roughly half opacity.
        queue.tick(start + Duration::from_millis(4500));
        let opacity = queue.pending().next().unwrap().opacity;
        assert!(opacity > 0.4 && opacity < 0.6, "opacity was {}", opacity);
    }

    #[test]
    fn test_pending_is_idempotent_within_a_tick() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new(3);
        queue.enqueue(entry("stable", now));
        queue.tick(now);

        let first: Vec<_> = queue.pending().map(|n| n.title.clone()).collect();
        let second: Vec<_> = queue.pending().map(|n| n.title.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_event_category_gets_long_duration() {
        let n = Notification::new("due", "now", Category::Event, Instant::now());
        assert_eq!(n.duration, EVENT_DURATION);
    }

    #[tokio::test]
    async fn test_notifier_delivers_through_channel() {
        let (notifier, mut receiver) = notification_channel();
        notifier.error("Save failed", "disk unhappy");

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.title, "Save failed");
        assert_eq!(received.category, Category::Error);
    }
}
