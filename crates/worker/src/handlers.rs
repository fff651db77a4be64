//! Queue handler glue.
//!
//! Thin wrappers turning raw [`QueueJob`] payloads into typed notify-crate
//! calls. A payload that fails to deserialize is a handler error like any
//! other: it goes through the retry policy and ends up parked as failed,
//! visible in the `queue_jobs` table, instead of being dropped silently.

use std::sync::Arc;

use tripful_db::DbPool;
use tripful_notify::{
    handle_notification_batch, handle_sms_deliver, NotificationBatch, SmsDeliveryJob, SmsSender,
};
use tripful_queue::{HandlerError, QueueJob};

/// Handle one `notification/batch` job.
pub async fn notification_batch(pool: DbPool, job: QueueJob) -> Result<(), HandlerError> {
    let batch: NotificationBatch = serde_json::from_value(job.payload)?;
    handle_notification_batch(&pool, batch).await?;
    Ok(())
}

/// Handle one `notification/deliver` job.
pub async fn sms_deliver(sender: Arc<dyn SmsSender>, job: QueueJob) -> Result<(), HandlerError> {
    let delivery: SmsDeliveryJob = serde_json::from_value(job.payload)?;
    handle_sms_deliver(sender.as_ref(), delivery).await?;
    Ok(())
}
