//! Generic queue consumer loop.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tripful_db::DbPool;

use crate::job::QueueJob;
use crate::repo::QueueRepo;

/// Boxed error type returned by job handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Run a consumer loop for one queue until `cancel` is triggered.
///
/// Each poll tick expires stale jobs, then drains every due job: claim,
/// invoke `handler`, and mark the job completed or failed. A handler error
/// feeds the retry/backoff policy; it never aborts the loop. Database
/// errors from the claim itself are logged and retried on the next tick.
pub async fn run_queue<F, Fut>(
    pool: DbPool,
    queue_name: &'static str,
    poll_interval: Duration,
    cancel: CancellationToken,
    handler: F,
) where
    F: Fn(QueueJob) -> Fut,
    Fut: Future<Output = Result<(), HandlerError>>,
{
    tracing::info!(
        queue = queue_name,
        poll_secs = poll_interval.as_secs(),
        "Queue consumer started"
    );

    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(queue = queue_name, "Queue consumer stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = drain(&pool, queue_name, &handler).await {
                    tracing::error!(queue = queue_name, error = %e, "Queue poll failed");
                }
            }
        }
    }
}

/// Process every due job currently on the queue.
async fn drain<F, Fut>(pool: &DbPool, queue_name: &str, handler: &F) -> Result<(), sqlx::Error>
where
    F: Fn(QueueJob) -> Fut,
    Fut: Future<Output = Result<(), HandlerError>>,
{
    let expired = QueueRepo::expire_stale(pool, queue_name).await?;
    if expired > 0 {
        tracing::warn!(queue = queue_name, expired, "Expired unclaimed jobs");
    }

    while let Some(job) = QueueRepo::claim_next(pool, queue_name).await? {
        let job_id = job.id;
        match handler(job).await {
            Ok(()) => {
                QueueRepo::complete(pool, job_id).await?;
            }
            Err(e) => {
                tracing::error!(
                    queue = queue_name,
                    job_id = %job_id,
                    error = %e,
                    "Job handler failed, scheduling retry"
                );
                QueueRepo::fail(pool, job_id).await?;
            }
        }
    }

    Ok(())
}
