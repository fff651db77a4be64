//! Repository for the `events` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use tripful_core::types::{DbId, Timestamp};

use crate::models::event::{ItineraryEvent, UpcomingEvent};

/// Provides read operations for itinerary events.
///
/// Soft-deleted events (`deleted_at IS NOT NULL`) are excluded from every
/// query here.
pub struct EventRepo;

impl EventRepo {
    /// List a trip's events whose start falls on the given calendar date in
    /// the given IANA timezone, ordered by start time.
    ///
    /// The date comparison happens in SQL so events on adjacent local dates
    /// never leak into a day's itinerary, even when their UTC date differs
    /// from their local one.
    pub async fn list_on_local_date(
        pool: &PgPool,
        trip_id: DbId,
        timezone: &str,
        local_date: NaiveDate,
    ) -> Result<Vec<ItineraryEvent>, sqlx::Error> {
        sqlx::query_as::<_, ItineraryEvent>(
            "SELECT name, start_time \
             FROM events \
             WHERE trip_id = $1 \
               AND deleted_at IS NULL \
               AND (start_time AT TIME ZONE $2)::date = $3 \
             ORDER BY start_time",
        )
        .bind(trip_id)
        .bind(timezone)
        .bind(local_date)
        .fetch_all(pool)
        .await
    }

    /// List non-deleted, non-all-day events starting within a UTC window.
    ///
    /// Used by the event reminder scanner to find events starting roughly
    /// one hour from now.
    pub async fn list_starting_between(
        pool: &PgPool,
        window_start: Timestamp,
        window_end: Timestamp,
    ) -> Result<Vec<UpcomingEvent>, sqlx::Error> {
        sqlx::query_as::<_, UpcomingEvent>(
            "SELECT id, trip_id, name, location \
             FROM events \
             WHERE start_time >= $1 \
               AND start_time <= $2 \
               AND deleted_at IS NULL \
               AND all_day = false \
             ORDER BY start_time",
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(pool)
        .await
    }
}
