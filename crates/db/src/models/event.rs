//! Itinerary event models.

use serde::Serialize;
use sqlx::FromRow;
use tripful_core::types::{DbId, Timestamp};

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub trip_id: DbId,
    pub created_by: DbId,
    pub name: String,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub all_day: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Projection used by the itinerary renderer: name and start instant only.
#[derive(Debug, Clone, FromRow)]
pub struct ItineraryEvent {
    pub name: String,
    pub start_time: Timestamp,
}

/// Projection used by the event reminder scanner.
#[derive(Debug, Clone, FromRow)]
pub struct UpcomingEvent {
    pub id: DbId,
    pub trip_id: DbId,
    pub name: String,
    pub location: Option<String>,
}
