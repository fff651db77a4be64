//! Batch notification dispatcher.
//!
//! Consumes `notification/batch` jobs and fans them out to the trip's
//! actively-attending members: one persisted notification per eligible
//! recipient, plus SMS delivery jobs for recipients whose preferences allow
//! it. For recurring (cron-class) notifications the `sent_reminders` ledger
//! makes queue redelivery idempotent per recipient.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tripful_core::notification_types::{
    TYPE_DAILY_ITINERARY, TYPE_EVENT_REMINDER, TYPE_TRIP_MESSAGE, TYPE_TRIP_UPDATE,
};
use tripful_core::types::DbId;
use tripful_db::models::member::GoingMember;
use tripful_db::models::notification::{NotificationContent, PreferenceFlags};
use tripful_db::repositories::{
    MemberRepo, NotificationPreferenceRepo, NotificationRepo, SentReminderRepo,
};
use tripful_db::DbPool;
use tripful_queue::{QueueRepo, QUEUE_NOTIFICATION_DELIVER};

use crate::deliver::SmsDeliveryJob;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Payload of one `notification/batch` job.
///
/// Produced by the schedulers and by application code broadcasting
/// `trip_message` / `trip_update` notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBatch {
    pub trip_id: DbId,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub body: String,
    /// Opaque JSON stored on each notification row. For recurring types it
    /// carries `referenceId`, identifying one occurrence of the reminder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Excluded from the recipient set (typically the acting user).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_user_id: Option<DbId>,
}

impl NotificationBatch {
    /// The `referenceId` carried in `data`, if any.
    pub fn reference_id(&self) -> Option<String> {
        let value = self.data.as_ref()?.get("referenceId")?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Error type for batch dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("invalid job payload: {0}")]
    Payload(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Preference mapping
// ---------------------------------------------------------------------------

/// The preference toggle controlling SMS delivery for a notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    EventReminders,
    DailyItinerary,
    TripMessages,
}

/// Map a notification type to its preference field.
///
/// Types without a mapping (notably `trip_update`) are not preference-gated
/// and not ledger-deduplicated.
pub fn preference_field(notification_type: &str) -> Option<PreferenceField> {
    match notification_type {
        TYPE_EVENT_REMINDER => Some(PreferenceField::EventReminders),
        TYPE_DAILY_ITINERARY => Some(PreferenceField::DailyItinerary),
        TYPE_TRIP_MESSAGE => Some(PreferenceField::TripMessages),
        _ => None,
    }
}

/// Decide whether a recipient with the given flags gets an SMS.
///
/// `trip_update` always sends, and so does any unmapped type: an unknown
/// type must never be silently swallowed, so the default is open.
pub fn should_send_sms(notification_type: &str, flags: &PreferenceFlags) -> bool {
    if notification_type == TYPE_TRIP_UPDATE {
        return true;
    }
    match preference_field(notification_type) {
        Some(PreferenceField::EventReminders) => flags.event_reminders,
        Some(PreferenceField::DailyItinerary) => flags.daily_itinerary,
        Some(PreferenceField::TripMessages) => flags.trip_messages,
        None => true,
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The per-recipient outcome of one batch job, computed before any write.
///
/// Per recipient the state machine is `candidate → (deduped-out |
/// notified)`, then `notified → (sms-sent | sms-suppressed)`; no recipient
/// appears in `sms_jobs` without appearing in `notify_user_ids`.
#[derive(Debug, Default)]
pub struct DispatchPlan {
    /// Recipients that get a notification row (and, when recurring, a
    /// ledger row).
    pub notify_user_ids: Vec<DbId>,
    /// One SMS delivery job per preference-eligible recipient.
    pub sms_jobs: Vec<SmsDeliveryJob>,
}

/// Build the dispatch plan for a batch job. Pure.
pub fn build_plan(
    batch: &NotificationBatch,
    recipients: &[GoingMember],
    prefs: &HashMap<DbId, PreferenceFlags>,
    already_sent: &HashSet<DbId>,
) -> DispatchPlan {
    let message = format!("{}: {}", batch.title, batch.body);
    let mut plan = DispatchPlan::default();

    for member in recipients {
        if already_sent.contains(&member.user_id) {
            continue;
        }

        plan.notify_user_ids.push(member.user_id);

        // Missing preference row means all-enabled.
        let flags = prefs.get(&member.user_id).copied().unwrap_or_default();
        if should_send_sms(&batch.notification_type, &flags) {
            plan.sms_jobs.push(SmsDeliveryJob {
                phone_number: member.phone_number.clone(),
                message: message.clone(),
            });
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Process one `notification/batch` job.
///
/// A missing trip or an empty recipient set is a normal empty result, not
/// an error. Infrastructure errors propagate to the queue's retry policy.
/// The ledger write happens after the notification insert so a crash
/// in between retries safely: duplicate notification rows are acceptable,
/// duplicate ledger rows are prevented by the unique constraint.
pub async fn handle_notification_batch(
    pool: &DbPool,
    batch: NotificationBatch,
) -> Result<(), DispatchError> {
    let members = MemberRepo::list_going_with_phone(pool, batch.trip_id).await?;

    let recipients: Vec<GoingMember> = match batch.exclude_user_id {
        Some(excluded) => members.into_iter().filter(|m| m.user_id != excluded).collect(),
        None => members,
    };

    if recipients.is_empty() {
        tracing::debug!(trip_id = %batch.trip_id, "Batch has no eligible recipients");
        return Ok(());
    }

    let user_ids: Vec<DbId> = recipients.iter().map(|m| m.user_id).collect();
    let prefs = NotificationPreferenceRepo::map_for_trip(pool, batch.trip_id, &user_ids).await?;

    // Recurring notifications carry a referenceId and a mapped preference
    // field; only those consult and update the ledger.
    let reference_id = batch.reference_id();
    let recurring = preference_field(&batch.notification_type).is_some() && reference_id.is_some();

    let already_sent: HashSet<DbId> = match (recurring, reference_id.as_deref()) {
        (true, Some(reference)) => SentReminderRepo::filter_already_sent(
            pool,
            &batch.notification_type,
            reference,
            &user_ids,
        )
        .await?
        .into_iter()
        .collect(),
        _ => HashSet::new(),
    };

    let plan = build_plan(&batch, &recipients, &prefs, &already_sent);

    if plan.notify_user_ids.is_empty() {
        tracing::debug!(
            trip_id = %batch.trip_id,
            notification_type = %batch.notification_type,
            "All recipients already handled for this occurrence"
        );
        return Ok(());
    }

    let content = NotificationContent {
        trip_id: Some(batch.trip_id),
        notification_type: batch.notification_type.clone(),
        title: batch.title.clone(),
        body: batch.body.clone(),
        data: batch.data.clone(),
    };
    let inserted = NotificationRepo::insert_many(pool, &content, &plan.notify_user_ids).await?;

    if let (true, Some(reference)) = (recurring, reference_id.as_deref()) {
        SentReminderRepo::insert_many(
            pool,
            &batch.notification_type,
            reference,
            &plan.notify_user_ids,
        )
        .await?;
    }

    if !plan.sms_jobs.is_empty() {
        let payloads: Vec<serde_json::Value> = plan
            .sms_jobs
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        QueueRepo::insert_batch(pool, QUEUE_NOTIFICATION_DELIVER, &payloads).await?;
    }

    tracing::info!(
        trip_id = %batch.trip_id,
        notification_type = %batch.notification_type,
        notified = inserted,
        sms_enqueued = plan.sms_jobs.len(),
        "Batch dispatched"
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
