//! Repository for the `members` table.

use sqlx::PgPool;
use tripful_core::types::DbId;

use crate::models::member::{GoingMember, RsvpStatus};

/// Provides read operations for trip membership.
pub struct MemberRepo;

impl MemberRepo {
    /// List `going` members of a trip joined with their phone numbers.
    ///
    /// This is the fan-out recipient set: only actively-attending members
    /// receive notifications.
    pub async fn list_going_with_phone(
        pool: &PgPool,
        trip_id: DbId,
    ) -> Result<Vec<GoingMember>, sqlx::Error> {
        sqlx::query_as::<_, GoingMember>(
            "SELECT m.user_id, u.phone_number \
             FROM members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.trip_id = $1 AND m.status = $2 \
             ORDER BY m.created_at",
        )
        .bind(trip_id)
        .bind(RsvpStatus::Going)
        .fetch_all(pool)
        .await
    }
}
