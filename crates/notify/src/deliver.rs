//! SMS delivery consumer.
//!
//! Consumes `notification/deliver` jobs, one phone number per job, so a
//! provider failure for one recipient retries only that recipient.

use serde::{Deserialize, Serialize};

use crate::sms::{SmsError, SmsSender};

/// Payload of one `notification/deliver` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsDeliveryJob {
    pub phone_number: String,
    pub message: String,
}

/// Process one delivery job: a single provider attempt, no local retry.
/// Errors propagate to the queue's retry policy.
pub async fn handle_sms_deliver(
    sender: &dyn SmsSender,
    job: SmsDeliveryJob,
) -> Result<(), SmsError> {
    sender.send_text(&job.phone_number, &job.message).await?;
    tracing::debug!(phone_number = %job.phone_number, "SMS delivery job done");
    Ok(())
}
