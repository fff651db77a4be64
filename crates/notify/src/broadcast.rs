//! Ad-hoc broadcast entry point.
//!
//! Application code (message posted, trip details changed) submits a batch
//! job directly instead of writing per-recipient rows itself; the dispatcher
//! owns recipient resolution and preference gating in one place.

use tripful_core::types::DbId;
use tripful_db::DbPool;
use tripful_queue::{QueueRepo, SendOptions, QUEUE_NOTIFICATION_BATCH};

use crate::batch::{DispatchError, NotificationBatch};

/// Enqueue a fan-out job for a trip-wide notification.
///
/// Returns the job id; `None` only if a singleton key on `batch`'s options
/// deduplicated it, which plain broadcasts never set, so callers can treat
/// `None` as unreachable. Broadcasts are deliberately not singleton-keyed:
/// two quick successive messages are two legitimate notifications.
pub async fn enqueue_trip_broadcast(
    pool: &DbPool,
    batch: &NotificationBatch,
) -> Result<Option<DbId>, DispatchError> {
    let job_id = QueueRepo::send(
        pool,
        QUEUE_NOTIFICATION_BATCH,
        &serde_json::to_value(batch)?,
        &SendOptions::default(),
    )
    .await?;

    tracing::debug!(
        trip_id = %batch.trip_id,
        notification_type = %batch.notification_type,
        "Broadcast enqueued"
    );
    Ok(job_id)
}
