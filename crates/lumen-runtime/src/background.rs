//! Low-frequency background refresh
//!
//! A single detached worker re-checks calendar events once per minute and
//! feeds due ones into the notification queue. It reads the durable document
//! fresh from disk each pass (read-only; the file stays single-writer from
//! the UI thread) so it sees whatever the calendar module last saved.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use lumen_core::{Notifier, PersistedBlob};

/// Titles of calendar events due at `date_key`/`time_label`.
///
/// The calendar persists `{ "events": { "YYYY-MM-DD": [{ "time", "title" }] } }`;
/// anything that does not match that shape is skipped.
fn due_events(blob: &PersistedBlob, date_key: &str, time_label: &str) -> Vec<String> {
    let Some(events) = blob
        .modules
        .get("Calendar")
        .and_then(|calendar| calendar.get("events"))
        .and_then(|events| events.get(date_key))
        .and_then(|day| day.as_array())
    else {
        return Vec::new();
    };

    events
        .iter()
        .filter(|event| event.get("time").and_then(|t| t.as_str()) == Some(time_label))
        .filter_map(|event| event.get("title").and_then(|t| t.as_str()))
        .map(str::to_string)
        .collect()
}

/// Spawn the due-event worker. Runs until the shell exits.
pub fn spawn_due_event_worker(
    state_path: PathBuf,
    notifier: Notifier,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "due-event worker started");
        let mut fired: HashSet<(String, String, String)> = HashSet::new();
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            let blob = PersistedBlob::read_from(&state_path);
            let now = chrono::Local::now();
            let date_key = now.format("%Y-%m-%d").to_string();
            let time_label = now.format("%I:%M %p").to_string();

            for title in due_events(&blob, &date_key, &time_label) {
                let key = (date_key.clone(), time_label.clone(), title.clone());
                if fired.insert(key) {
                    debug!(title, "calendar event due");
                    notifier.event("Calendar Event", format!("{} at {}", title, time_label));
                }
            }

            // Yesterday's fired markers are never matched again.
            fired.retain(|(date, _, _)| *date == date_key);
        }
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blob_with_calendar(value: serde_json::Value) -> PersistedBlob {
        let mut blob = PersistedBlob::default();
        blob.modules.insert("Calendar".to_string(), value);
        blob
    }

    #[test]
    fn test_due_events_matches_date_and_time() {
        let blob = blob_with_calendar(json!({
            "events": {
                "2026-08-06": [
                    {"time": "07:30 AM", "title": "Standup"},
                    {"time": "09:00 PM", "title": "Backup"}
                ]
            }
        }));

        let due = due_events(&blob, "2026-08-06", "07:30 AM");
        assert_eq!(due, vec!["Standup".to_string()]);
        assert!(due_events(&blob, "2026-08-06", "08:00 AM").is_empty());
        assert!(due_events(&blob, "2026-08-07", "07:30 AM").is_empty());
    }

    #[test]
    fn test_due_events_tolerates_malformed_document() {
        assert!(due_events(&PersistedBlob::default(), "2026-08-06", "07:30 AM").is_empty());

        let blob = blob_with_calendar(json!({"events": "not-a-map"}));
        assert!(due_events(&blob, "2026-08-06", "07:30 AM").is_empty());

        let blob = blob_with_calendar(json!({
            "events": {"2026-08-06": [{"title": "no time field"}]}
        }));
        assert!(due_events(&blob, "2026-08-06", "07:30 AM").is_empty());
    }
}
