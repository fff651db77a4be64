//! Dedup ledger models.

use serde::Serialize;
use sqlx::FromRow;
use tripful_core::types::{DbId, Timestamp};

/// A row from the `sent_reminders` ledger.
///
/// One row per (type, reference_id, user_id) triple, written after a
/// recurring notification is persisted for that user. The triple is unique;
/// a duplicate insert is ignored, which is what makes queue redelivery of
/// the same batch job safe.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SentReminder {
    pub id: DbId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub reminder_type: String,
    pub reference_id: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}
