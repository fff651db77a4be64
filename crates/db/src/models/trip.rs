//! Trip models.

use chrono::NaiveDate;
use sqlx::FromRow;
use tripful_core::types::DbId;

/// Projection of a trip that is eligible for scheduled reminders.
///
/// Returned only by [`TripRepo::list_schedulable`] whose query guarantees
/// both dates are present, so the fields are non-optional here.
///
/// [`TripRepo::list_schedulable`]: crate::repositories::TripRepo::list_schedulable
#[derive(Debug, Clone, FromRow)]
pub struct SchedulableTrip {
    pub id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub preferred_timezone: String,
}
