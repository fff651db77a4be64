//! Tripful notification fan-out pipeline.
//!
//! Two scheduled producers and two queue consumers cooperate around the
//! `notification/batch` queue:
//!
//! - [`DailyItineraryScheduler`] — periodic scan deciding, per trip, whether
//!   "now" falls inside that trip's local morning window; submits one batch
//!   job per qualifying trip per day.
//! - [`EventReminderScheduler`] — periodic scan for events starting in about
//!   an hour; submits one batch job per event.
//! - [`batch::handle_notification_batch`] — consumes batch jobs: resolves
//!   going members, applies preferences and the dedup ledger, persists
//!   notifications, and emits SMS delivery jobs.
//! - [`deliver::handle_sms_deliver`] — consumes delivery jobs and hands them
//!   to an [`SmsSender`].
//!
//! The queue is at-least-once; recipient-level idempotency for recurring
//! notifications comes from the `sent_reminders` ledger, submission-level
//! idempotency from the queue's singleton keys. The two mechanisms protect
//! against different failure modes and are both required.

pub mod batch;
pub mod broadcast;
pub mod deliver;
pub mod event_reminder;
pub mod itinerary;
pub mod sms;

pub use batch::{handle_notification_batch, NotificationBatch};
pub use broadcast::enqueue_trip_broadcast;
pub use deliver::{handle_sms_deliver, SmsDeliveryJob};
pub use event_reminder::EventReminderScheduler;
pub use itinerary::DailyItineraryScheduler;
pub use sms::{HttpSmsSender, LogSmsSender, SmsError, SmsSender};
