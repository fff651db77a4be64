//! Notification entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tripful_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub trip_id: Option<DbId>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Shared content for one fan-out batch: every recipient of the batch gets
/// an identical notification row, so the content is carried once and the
/// recipient list separately.
#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub trip_id: Option<DbId>,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
}

/// A row from the `notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub user_id: DbId,
    pub trip_id: DbId,
    pub event_reminders: bool,
    pub daily_itinerary: bool,
    pub trip_messages: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The three per-trip delivery toggles, collapsed from a preference row.
///
/// Absence of a row must never suppress delivery, so the `Default` is
/// all-enabled and callers apply it at the read site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PreferenceFlags {
    pub event_reminders: bool,
    pub daily_itinerary: bool,
    pub trip_messages: bool,
}

impl Default for PreferenceFlags {
    fn default() -> Self {
        Self {
            event_reminders: true,
            daily_itinerary: true,
            trip_messages: true,
        }
    }
}
