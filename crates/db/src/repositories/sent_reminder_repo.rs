//! Repository for the `sent_reminders` dedup ledger.

use sqlx::PgPool;
use tripful_core::types::DbId;

/// Provides append-and-check operations for the dedup ledger.
///
/// The ledger is deliberately separate from `notifications`: existence
/// checks stay cheap on the (type, reference_id) index instead of scanning
/// the notification table, and there is no foreign key between the two.
pub struct SentReminderRepo;

impl SentReminderRepo {
    /// Return the subset of `user_ids` that already have a ledger row for
    /// this (type, reference_id) occurrence.
    pub async fn filter_already_sent(
        pool: &PgPool,
        reminder_type: &str,
        reference_id: &str,
        user_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(
            "SELECT user_id FROM sent_reminders \
             WHERE type = $1 AND reference_id = $2 AND user_id = ANY($3)",
        )
        .bind(reminder_type)
        .bind(reference_id)
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }

    /// Insert one ledger row per user in a single round-trip.
    ///
    /// `ON CONFLICT DO NOTHING` on the (type, reference_id, user_id) unique
    /// constraint: a concurrent redelivery that raced us here silently
    /// loses, which is the intended outcome, not an error. Returns the
    /// number of rows actually written.
    pub async fn insert_many(
        pool: &PgPool,
        reminder_type: &str,
        reference_id: &str,
        user_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO sent_reminders (type, reference_id, user_id) \
             SELECT $1, $2, u FROM UNNEST($3::uuid[]) AS u \
             ON CONFLICT (type, reference_id, user_id) DO NOTHING",
        )
        .bind(reminder_type)
        .bind(reference_id)
        .bind(user_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
