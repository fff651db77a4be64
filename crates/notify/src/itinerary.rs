//! Daily itinerary scheduler.
//!
//! [`DailyItineraryScheduler`] runs as a background task, periodically
//! scanning all schedulable trips and deciding, per trip, whether the
//! current instant falls inside that trip's own local morning window. Each
//! qualifying trip gets exactly one `notification/batch` job per local day,
//! enforced by a queue singleton key.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tripful_core::notification_types::TYPE_DAILY_ITINERARY;
use tripful_db::models::event::ItineraryEvent;
use tripful_db::models::trip::SchedulableTrip;
use tripful_db::repositories::{EventRepo, TripRepo};
use tripful_db::DbPool;
use tripful_queue::{QueueRepo, SendOptions, QUEUE_NOTIFICATION_BATCH};

use crate::batch::NotificationBatch;

/// Lower bound of the morning window: 07:45 local, in minutes since
/// midnight.
const MORNING_WINDOW_START_MINS: u32 = 7 * 60 + 45;

/// Upper bound of the morning window: 08:15 local, inclusive.
///
/// The 31-minute band tolerates scan jitter without double-firing across
/// adjacent ticks; the scan interval must stay below the band width.
const MORNING_WINDOW_END_MINS: u32 = 8 * 60 + 15;

/// How long a submitted batch job may sit unclaimed before it expires and
/// releases its singleton key.
const SINGLETON_EXPIRE_SECS: i64 = 900;

/// Body used when the target date has no events.
const EMPTY_DAY_BODY: &str = "No events scheduled for today.";

/// Per-trip evaluation failures. One bad trip must never abort the scan of
/// the rest.
#[derive(Debug, thiserror::Error)]
pub enum ItineraryError {
    #[error("invalid IANA timezone {0:?}")]
    Timezone(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Whether a local wall-clock time falls in the 07:45–08:15 morning band,
/// inclusive at both ends.
pub fn in_morning_window(local_time: NaiveTime) -> bool {
    let minutes = local_time.hour() * 60 + local_time.minute();
    (MORNING_WINDOW_START_MINS..=MORNING_WINDOW_END_MINS).contains(&minutes)
}

/// Whether a local calendar date falls within the trip's date range,
/// inclusive at both ends: a trip fires on its start date and still fires
/// on its end date.
pub fn date_in_trip_range(local_date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    local_date >= start && local_date <= end
}

/// Render the day's events as a numbered, time-sorted list, or the
/// fixed empty-day body. Events must already be sorted by start time.
pub fn render_itinerary(events: &[ItineraryEvent], tz: Tz) -> String {
    if events.is_empty() {
        return EMPTY_DAY_BODY.to_string();
    }
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let local_start = event.start_time.with_timezone(&tz);
            format!(
                "{}. {} - {}",
                index + 1,
                local_start.format("%-I:%M %p"),
                event.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// DailyItineraryScheduler
// ---------------------------------------------------------------------------

/// Background service submitting one itinerary batch job per qualifying
/// trip per local day.
pub struct DailyItineraryScheduler {
    pool: DbPool,
    scan_interval: Duration,
}

impl DailyItineraryScheduler {
    /// Create a new scheduler with the given database pool and scan
    /// interval. The interval must be shorter than the 31-minute morning
    /// band or trips can be skipped entirely.
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
            "Daily itinerary scheduler started"
        );

        let mut interval = tokio::time::interval(self.scan_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Daily itinerary scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.scan().await {
                        tracing::error!(error = %e, "Daily itinerary scan failed");
                    }
                }
            }
        }
    }

    /// Evaluate every schedulable trip once.
    ///
    /// Per-trip failures (bad timezone string, per-trip query error) are
    /// logged and skipped so the remaining trips still get their scan.
    async fn scan(&self) -> Result<(), sqlx::Error> {
        let trips = TripRepo::list_schedulable(&self.pool).await?;
        let mut submitted = 0usize;

        for trip in &trips {
            match self.evaluate_trip(trip).await {
                Ok(true) => submitted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        trip_id = %trip.id,
                        error = %e,
                        "Skipping trip in itinerary scan"
                    );
                }
            }
        }

        tracing::info!(
            scanned = trips.len(),
            submitted,
            "Daily itinerary scan complete"
        );
        Ok(())
    }

    /// Evaluate one trip against "now"; returns `true` when a batch job was
    /// submitted (a queue-level dedup no-op counts as not submitted).
    async fn evaluate_trip(&self, trip: &SchedulableTrip) -> Result<bool, ItineraryError> {
        let tz: Tz = trip
            .preferred_timezone
            .parse()
            .map_err(|_| ItineraryError::Timezone(trip.preferred_timezone.clone()))?;

        let local_now = Utc::now().with_timezone(&tz);
        let local_date = local_now.date_naive();

        if !date_in_trip_range(local_date, trip.start_date, trip.end_date) {
            return Ok(false);
        }
        if !in_morning_window(local_now.time()) {
            return Ok(false);
        }

        let events =
            EventRepo::list_on_local_date(&self.pool, trip.id, &trip.preferred_timezone, local_date)
                .await?;
        let body = render_itinerary(&events, tz);

        let reference_id = format!("{}:{}", trip.id, local_date);
        let payload = NotificationBatch {
            trip_id: trip.id,
            notification_type: TYPE_DAILY_ITINERARY.to_string(),
            title: format!("{} - Today's Schedule", trip.name),
            body,
            data: Some(json!({ "tripId": trip.id, "referenceId": reference_id })),
            exclude_user_id: None,
        };

        let job_id = QueueRepo::send(
            &self.pool,
            QUEUE_NOTIFICATION_BATCH,
            &serde_json::to_value(&payload)?,
            &SendOptions::singleton(
                format!("daily-itinerary:{reference_id}"),
                SINGLETON_EXPIRE_SECS,
            ),
        )
        .await?;

        Ok(job_id.is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Build an event starting at the given local wall-clock time in `tz`,
    /// stored (as in the database) as a UTC instant.
    fn event_at(tz: Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32, name: &str) -> ItineraryEvent {
        let local = tz.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap();
        let utc: DateTime<Utc> = local.with_timezone(&Utc);
        ItineraryEvent {
            name: name.to_string(),
            start_time: utc,
        }
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        assert!(in_morning_window(time(7, 45)));
        assert!(in_morning_window(time(8, 0)));
        assert!(in_morning_window(time(8, 15)));
    }

    #[test]
    fn window_excludes_adjacent_minutes() {
        assert!(!in_morning_window(time(7, 44)));
        assert!(!in_morning_window(time(8, 16)));
        assert!(!in_morning_window(time(12, 0)));
        assert!(!in_morning_window(time(0, 0)));
    }

    #[test]
    fn trip_fires_on_start_and_end_dates() {
        let start = date(2026, 6, 1);
        let end = date(2026, 6, 7);
        assert!(date_in_trip_range(start, start, end));
        assert!(date_in_trip_range(end, start, end));
        assert!(date_in_trip_range(date(2026, 6, 4), start, end));
    }

    #[test]
    fn trip_does_not_fire_outside_range() {
        let start = date(2026, 6, 1);
        let end = date(2026, 6, 7);
        assert!(!date_in_trip_range(date(2026, 5, 31), start, end));
        assert!(!date_in_trip_range(date(2026, 6, 8), start, end));
    }

    #[test]
    fn renders_numbered_time_sorted_lines() {
        let tz = chrono_tz::America::New_York;
        let events = vec![
            event_at(tz, 2026, 6, 2, 9, 0, "Morning Coffee"),
            event_at(tz, 2026, 6, 2, 14, 30, "City Tour"),
        ];
        assert_eq!(
            render_itinerary(&events, tz),
            "1. 9:00 AM - Morning Coffee\n2. 2:30 PM - City Tour"
        );
    }

    #[test]
    fn renders_empty_day_literal() {
        let tz = chrono_tz::Europe::Paris;
        assert_eq!(render_itinerary(&[], tz), "No events scheduled for today.");
    }

    #[test]
    fn renders_times_in_trip_timezone_not_utc() {
        // 23:30 UTC is 8:30 AM next day in Tokyo.
        let tz = chrono_tz::Asia::Tokyo;
        let utc_start = Utc.with_ymd_and_hms(2026, 6, 1, 23, 30, 0).unwrap();
        let events = vec![ItineraryEvent {
            name: "Fish Market".to_string(),
            start_time: utc_start,
        }];
        assert_eq!(render_itinerary(&events, tz), "1. 8:30 AM - Fish Market");
    }

    #[test]
    fn noon_and_midnight_render_as_twelve() {
        let tz = chrono_tz::UTC;
        let events = vec![
            event_at(tz, 2026, 6, 2, 0, 5, "Stargazing"),
            event_at(tz, 2026, 6, 2, 12, 0, "Lunch"),
        ];
        assert_eq!(
            render_itinerary(&events, tz),
            "1. 12:05 AM - Stargazing\n2. 12:00 PM - Lunch"
        );
    }
}
