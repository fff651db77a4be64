//! Repository for the `notification_preferences` table.

use std::collections::HashMap;

use sqlx::PgPool;
use tripful_core::types::DbId;

use crate::models::notification::{NotificationPreference, PreferenceFlags};

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, user_id, trip_id, event_reminders, daily_itinerary, trip_messages, \
     created_at, updated_at";

/// Provides operations for per-trip notification preferences.
///
/// A user/trip pair without a row means "everything enabled". That fallback
/// lives at the read site, never in the database: the row may simply never
/// have been created.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Get the preference row for a user and trip, if one exists.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
        trip_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_preferences \
             WHERE user_id = $1 AND trip_id = $2"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(trip_id)
            .fetch_optional(pool)
            .await
    }

    /// Batch-fetch preference flags for a set of users on one trip.
    ///
    /// Users with no stored row are absent from the map; callers collapse
    /// that to [`PreferenceFlags::default`] (all enabled).
    pub async fn map_for_trip(
        pool: &PgPool,
        trip_id: DbId,
        user_ids: &[DbId],
    ) -> Result<HashMap<DbId, PreferenceFlags>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(DbId, bool, bool, bool)> = sqlx::query_as(
            "SELECT user_id, event_reminders, daily_itinerary, trip_messages \
             FROM notification_preferences \
             WHERE trip_id = $1 AND user_id = ANY($2)",
        )
        .bind(trip_id)
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, event_reminders, daily_itinerary, trip_messages)| {
                (
                    user_id,
                    PreferenceFlags {
                        event_reminders,
                        daily_itinerary,
                        trip_messages,
                    },
                )
            })
            .collect())
    }

    /// Insert or update the preference row for a user and trip.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        trip_id: DbId,
        flags: &PreferenceFlags,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (user_id, trip_id, event_reminders, daily_itinerary, trip_messages) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, trip_id) DO UPDATE SET \
                event_reminders = EXCLUDED.event_reminders, \
                daily_itinerary = EXCLUDED.daily_itinerary, \
                trip_messages = EXCLUDED.trip_messages, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(trip_id)
            .bind(flags.event_reminders)
            .bind(flags.daily_itinerary)
            .bind(flags.trip_messages)
            .fetch_one(pool)
            .await
    }

    /// Create the all-enabled default row for a user joining a trip.
    ///
    /// Idempotent: does nothing if a row already exists.
    pub async fn create_default(
        pool: &PgPool,
        user_id: DbId,
        trip_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO notification_preferences (user_id, trip_id) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id, trip_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(trip_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
