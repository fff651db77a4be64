//! Trip membership models.

use serde::Serialize;
use sqlx::FromRow;
use tripful_core::types::DbId;

/// RSVP status for a trip member, mapped to the `rsvp_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[sqlx(type_name = "rsvp_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Going,
    NotGoing,
    Maybe,
    NoResponse,
}

/// Projection of a `going` member joined with the user's phone number.
///
/// This is the fan-out recipient unit: one row per member the batch
/// dispatcher may notify.
#[derive(Debug, Clone, FromRow)]
pub struct GoingMember {
    pub user_id: DbId,
    pub phone_number: String,
}
