//! Event reminder scheduler.
//!
//! [`EventReminderScheduler`] periodically scans for events starting roughly
//! one hour from now and submits one `notification/batch` job per event.
//! Queue singleton keys keep overlapping scan windows from double-submitting
//! the same event.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tripful_core::notification_types::TYPE_EVENT_REMINDER;
use tripful_db::models::event::UpcomingEvent;
use tripful_db::repositories::{EventRepo, TripRepo};
use tripful_db::DbPool;
use tripful_queue::{QueueRepo, SendOptions, QUEUE_NOTIFICATION_BATCH};

use crate::batch::{DispatchError, NotificationBatch};

/// The scan window: events starting between 55 and 65 minutes from now.
///
/// Ten minutes wide so a missed or late tick of the 5-minute scan interval
/// still catches every event; the singleton key absorbs the overlap between
/// consecutive windows.
const WINDOW_START_MINS: i64 = 55;
const WINDOW_END_MINS: i64 = 65;

/// How long a submitted reminder job may sit unclaimed before it expires
/// and releases its singleton key.
const SINGLETON_EXPIRE_SECS: i64 = 300;

/// Title used when the owning trip row has disappeared mid-scan.
const FALLBACK_TITLE: &str = "Trip";

/// Reminder body: event name, fixed lead phrase, optional location.
pub fn reminder_body(event: &UpcomingEvent) -> String {
    match &event.location {
        Some(location) => format!("{} starts in 1 hour at {}", event.name, location),
        None => format!("{} starts in 1 hour", event.name),
    }
}

/// Background service submitting one reminder batch job per upcoming event.
pub struct EventReminderScheduler {
    pool: DbPool,
    scan_interval: Duration,
}

impl EventReminderScheduler {
    pub fn new(pool: DbPool, scan_interval: Duration) -> Self {
        Self {
            pool,
            scan_interval,
        }
    }

    /// Run the scan loop. Exits when `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.scan_interval.as_secs(),
            "Event reminder scheduler started"
        );

        let mut interval = tokio::time::interval(self.scan_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event reminder scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.scan().await {
                        tracing::error!(error = %e, "Event reminder scan failed");
                    }
                }
            }
        }
    }

    /// One scan pass over the upcoming-events window.
    ///
    /// Per-event submit failures are logged and skipped so one bad event
    /// cannot block reminders for the rest of the window.
    async fn scan(&self) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let window_start = now + chrono::Duration::minutes(WINDOW_START_MINS);
        let window_end = now + chrono::Duration::minutes(WINDOW_END_MINS);

        let events = EventRepo::list_starting_between(&self.pool, window_start, window_end).await?;
        if events.is_empty() {
            return Ok(());
        }

        let trip_ids: Vec<_> = events.iter().map(|e| e.trip_id).collect();
        let trip_names = TripRepo::names_by_ids(&self.pool, &trip_ids).await?;

        let mut submitted = 0usize;
        for event in &events {
            let title = trip_names
                .get(&event.trip_id)
                .cloned()
                .unwrap_or_else(|| FALLBACK_TITLE.to_string());

            match self.submit_reminder(event, title).await {
                Ok(true) => submitted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        event_id = %event.id,
                        error = %e,
                        "Skipping event in reminder scan"
                    );
                }
            }
        }

        tracing::info!(
            scanned = events.len(),
            submitted,
            "Event reminder scan complete"
        );
        Ok(())
    }

    /// Submit one reminder batch job; returns `true` when the job was
    /// accepted (a singleton no-op counts as not submitted).
    async fn submit_reminder(
        &self,
        event: &UpcomingEvent,
        title: String,
    ) -> Result<bool, DispatchError> {
        let payload = NotificationBatch {
            trip_id: event.trip_id,
            notification_type: TYPE_EVENT_REMINDER.to_string(),
            title,
            body: reminder_body(event),
            data: Some(json!({ "eventId": event.id, "referenceId": event.id })),
            exclude_user_id: None,
        };

        let job_id = QueueRepo::send(
            &self.pool,
            QUEUE_NOTIFICATION_BATCH,
            &serde_json::to_value(&payload)?,
            &SendOptions::singleton(format!("event-reminder:{}", event.id), SINGLETON_EXPIRE_SECS),
        )
        .await?;

        Ok(job_id.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn event(location: Option<&str>) -> UpcomingEvent {
        UpcomingEvent {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            name: "Sunset Cruise".to_string(),
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn body_includes_location_when_present() {
        assert_eq!(
            reminder_body(&event(Some("Pier 39"))),
            "Sunset Cruise starts in 1 hour at Pier 39"
        );
    }

    #[test]
    fn body_omits_location_when_absent() {
        assert_eq!(reminder_body(&event(None)), "Sunset Cruise starts in 1 hour");
    }
}
