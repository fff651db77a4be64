//! Repository for the `queue_jobs` table.

use sqlx::PgPool;
use tripful_core::types::DbId;

use crate::job::{QueueJob, SendOptions, DEFAULT_RETRY_LIMIT, STATE_ACTIVE, STATE_CREATED};

/// Column list for `queue_jobs` queries.
const COLUMNS: &str = "id, queue_name, payload, state, singleton_key, retry_count, retry_limit, \
     start_after, expire_at, claimed_at, completed_at, created_at";

/// Base delay in seconds for the exponential retry backoff (10s, 20s, 40s…).
const RETRY_BASE_DELAY_SECS: f64 = 10.0;

/// Provides submission and claim operations for background jobs.
pub struct QueueRepo;

impl QueueRepo {
    /// Submit one job, returning its id, or `None` when an unexpired job
    /// with the same singleton key is already waiting on this queue.
    ///
    /// Dedup is enforced twice: a `NOT EXISTS` guard for the common case,
    /// and the partial unique index on (queue_name, singleton_key) for the
    /// race where two producers pass the guard concurrently. The index
    /// violation is mapped to `Ok(None)` — a duplicate submission is a
    /// no-op, never an error.
    pub async fn send(
        pool: &PgPool,
        queue_name: &str,
        payload: &serde_json::Value,
        opts: &SendOptions,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "INSERT INTO queue_jobs (queue_name, payload, singleton_key, expire_at, retry_limit) \
             SELECT $1, $2, $3, \
                    CASE WHEN $4::bigint IS NULL THEN NULL \
                         ELSE NOW() + make_interval(secs => $4) END, \
                    $5 \
             WHERE $3::text IS NULL OR NOT EXISTS ( \
                 SELECT 1 FROM queue_jobs \
                 WHERE queue_name = $1 \
                   AND singleton_key = $3 \
                   AND state = '{STATE_CREATED}' \
                   AND (expire_at IS NULL OR expire_at > NOW()) \
             ) \
             RETURNING id"
        );
        let result = sqlx::query_scalar::<_, DbId>(&query)
            .bind(queue_name)
            .bind(payload)
            .bind(&opts.singleton_key)
            .bind(opts.expire_secs)
            .bind(opts.retry_limit.unwrap_or(DEFAULT_RETRY_LIMIT))
            .fetch_optional(pool)
            .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Submit a batch of independent jobs in one round-trip (no dedup keys).
    ///
    /// Returns the number of jobs inserted. A no-op when `payloads` is
    /// empty, but callers that can know the batch is empty should skip the
    /// call entirely.
    pub async fn insert_batch(
        pool: &PgPool,
        queue_name: &str,
        payloads: &[serde_json::Value],
    ) -> Result<u64, sqlx::Error> {
        if payloads.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO queue_jobs (queue_name, payload) \
             SELECT $1, p FROM UNNEST($2::jsonb[]) AS p",
        )
        .bind(queue_name)
        .bind(payloads)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark unclaimed jobs past their expiry as failed.
    ///
    /// Run by the consumer loop before each claim so expired submissions
    /// release their singleton keys. Returns the number of jobs expired.
    pub async fn expire_stale(pool: &PgPool, queue_name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_jobs \
             SET state = 'failed' \
             WHERE queue_name = $1 \
               AND state = 'created' \
               AND expire_at IS NOT NULL \
               AND expire_at <= NOW()",
        )
        .bind(queue_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Atomically claim the next due job on a queue.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` to prevent double-dispatch when
    /// multiple worker processes poll the same queue.
    pub async fn claim_next(
        pool: &PgPool,
        queue_name: &str,
    ) -> Result<Option<QueueJob>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_jobs \
             SET state = '{STATE_ACTIVE}', claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM queue_jobs \
                 WHERE queue_name = $1 \
                   AND state = '{STATE_CREATED}' \
                   AND start_after <= NOW() \
                 ORDER BY created_at \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueJob>(&query)
            .bind(queue_name)
            .fetch_optional(pool)
            .await
    }

    /// Mark a claimed job as successfully completed.
    pub async fn complete(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE queue_jobs SET state = 'completed', completed_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a handler failure.
    ///
    /// Below the retry limit, the job goes back to `created` with an
    /// exponential backoff on `start_after`; past it, the job is parked as
    /// `failed`. The singleton key is cleared on requeue: the dedup window
    /// covers submission only, and keeping the key would collide with the
    /// next legitimate scheduled send.
    pub async fn fail(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE queue_jobs \
             SET retry_count = retry_count + 1, \
                 state = CASE WHEN retry_count < retry_limit THEN 'created' ELSE 'failed' END, \
                 singleton_key = NULL, \
                 claimed_at = NULL, \
                 start_after = NOW() + make_interval(secs => $2 * POWER(2, retry_count)) \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(RETRY_BASE_DELAY_SECS)
        .execute(pool)
        .await?;
        Ok(())
    }
}
