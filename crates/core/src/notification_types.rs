//! Well-known notification type name constants.
//!
//! These must match the values stored in the `notifications.type` and
//! `sent_reminders.type` columns and referenced by the schedulers and the
//! batch dispatcher.

/// Morning itinerary summary, fired once per trip per local day.
pub const TYPE_DAILY_ITINERARY: &str = "daily_itinerary";

/// One-hour-before reminder for a single scheduled event.
pub const TYPE_EVENT_REMINDER: &str = "event_reminder";

/// A chat message posted to a trip.
pub const TYPE_TRIP_MESSAGE: &str = "trip_message";

/// Trip detail change (dates, destination, cancellation). Always delivered
/// regardless of member preferences.
pub const TYPE_TRIP_UPDATE: &str = "trip_update";
