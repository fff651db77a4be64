//! Repository for the `trips` table.

use std::collections::HashMap;

use sqlx::PgPool;
use tripful_core::types::DbId;

use crate::models::trip::SchedulableTrip;

/// Provides read operations for trips.
///
/// Trips are created and edited by the API layer; this subsystem only reads
/// them.
pub struct TripRepo;

impl TripRepo {
    /// List trips eligible for scheduled reminders: not cancelled, with both
    /// a start and an end date.
    ///
    /// The date-range check against "today" cannot happen here because
    /// "today" depends on each trip's own timezone; the scheduler applies it
    /// per trip after converting the current instant.
    pub async fn list_schedulable(pool: &PgPool) -> Result<Vec<SchedulableTrip>, sqlx::Error> {
        sqlx::query_as::<_, SchedulableTrip>(
            "SELECT id, name, start_date, end_date, preferred_timezone \
             FROM trips \
             WHERE cancelled = false \
               AND start_date IS NOT NULL \
               AND end_date IS NOT NULL \
             ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
    }

    /// Resolve trip names for a set of ids in one query.
    pub async fn names_by_ids(
        pool: &PgPool,
        trip_ids: &[DbId],
    ) -> Result<HashMap<DbId, String>, sqlx::Error> {
        if trip_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, (DbId, String)>(
            "SELECT id, name FROM trips WHERE id = ANY($1)",
        )
        .bind(trip_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
