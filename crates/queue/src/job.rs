//! Queue job model and submission options.

use serde::Serialize;
use sqlx::FromRow;
use tripful_core::types::{DbId, Timestamp};

/// Job state: waiting to be claimed.
pub const STATE_CREATED: &str = "created";

/// Job state: claimed by a worker and being processed.
pub const STATE_ACTIVE: &str = "active";

/// Job state: handler finished successfully.
pub const STATE_COMPLETED: &str = "completed";

/// Job state: expired, or handler failed past the retry limit.
pub const STATE_FAILED: &str = "failed";

/// A row from the `queue_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueJob {
    pub id: DbId,
    pub queue_name: String,
    pub payload: serde_json::Value,
    pub state: String,
    pub singleton_key: Option<String>,
    pub retry_count: i32,
    pub retry_limit: i32,
    pub start_after: Timestamp,
    pub expire_at: Option<Timestamp>,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Options for a single [`QueueRepo::send`] submission.
///
/// [`QueueRepo::send`]: crate::repo::QueueRepo::send
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Submission-level dedup key. While an unexpired job with this key is
    /// waiting on the same queue, duplicate sends are no-ops.
    pub singleton_key: Option<String>,

    /// Seconds until an unclaimed job expires. Expired jobs are swept to
    /// `failed` by [`QueueRepo::expire_stale`] at the top of each consumer
    /// poll and no longer block their singleton key, so a stuck submission
    /// cannot wedge future occurrences.
    ///
    /// [`QueueRepo::expire_stale`]: crate::repo::QueueRepo::expire_stale
    pub expire_secs: Option<i64>,

    /// Handler retry limit; defaults to [`DEFAULT_RETRY_LIMIT`].
    pub retry_limit: Option<i32>,
}

/// Default number of handler retries before a job is parked as failed.
pub const DEFAULT_RETRY_LIMIT: i32 = 3;

impl SendOptions {
    /// Options for a deduplicated scheduled submission.
    pub fn singleton(key: impl Into<String>, expire_secs: i64) -> Self {
        Self {
            singleton_key: Some(key.into()),
            expire_secs: Some(expire_secs),
            retry_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_have_no_dedup() {
        let opts = SendOptions::default();
        assert!(opts.singleton_key.is_none());
        assert!(opts.expire_secs.is_none());
        assert!(opts.retry_limit.is_none());
    }

    #[test]
    fn singleton_options_carry_key_and_expiry() {
        let opts = SendOptions::singleton("daily-itinerary:t1:2026-08-30", 900);
        assert_eq!(
            opts.singleton_key.as_deref(),
            Some("daily-itinerary:t1:2026-08-30")
        );
        assert_eq!(opts.expire_secs, Some(900));
    }
}
