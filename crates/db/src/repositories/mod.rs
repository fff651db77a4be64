//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod member_repo;
pub mod notification_preference_repo;
pub mod notification_repo;
pub mod sent_reminder_repo;
pub mod trip_repo;

pub use event_repo::EventRepo;
pub use member_repo::MemberRepo;
pub use notification_preference_repo::NotificationPreferenceRepo;
pub use notification_repo::NotificationRepo;
pub use sent_reminder_repo::SentReminderRepo;
pub use trip_repo::TripRepo;
