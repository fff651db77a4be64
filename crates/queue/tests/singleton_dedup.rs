//! Integration tests for queue submission, singleton dedup, and the
//! retry/expiry state machine, run against a real database.

use serde_json::json;
use sqlx::PgPool;
use tripful_queue::{QueueRepo, SendOptions, QUEUE_NOTIFICATION_BATCH};

// ---------------------------------------------------------------------------
// Test: duplicate singleton send is a no-op
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_singleton_send_returns_none(pool: PgPool) {
    let opts = SendOptions::singleton("daily-itinerary:t1:2026-06-02", 900);

    let first = QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({"n": 1}), &opts)
        .await
        .unwrap();
    assert!(first.is_some(), "first send should insert");

    let second = QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({"n": 2}), &opts)
        .await
        .unwrap();
    assert!(
        second.is_none(),
        "second send with the same singleton key should be a no-op"
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "only one job row should exist");
}

// ---------------------------------------------------------------------------
// Test: sends without a singleton key always insert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn plain_sends_are_never_deduplicated(pool: PgPool) {
    let opts = SendOptions::default();

    let first = QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({"n": 1}), &opts)
        .await
        .unwrap();
    let second = QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({"n": 1}), &opts)
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_some());
    assert_ne!(first, second, "each plain send should create its own job");
}

// ---------------------------------------------------------------------------
// Test: a claimed job no longer blocks its singleton key
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claimed_job_releases_singleton_key(pool: PgPool) {
    let opts = SendOptions::singleton("event-reminder:e1", 300);

    QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({}), &opts)
        .await
        .unwrap();

    let claimed = QueueRepo::claim_next(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap()
        .expect("submitted job should be claimable");
    assert_eq!(claimed.singleton_key.as_deref(), Some("event-reminder:e1"));

    // The dedup window covers waiting jobs only; once claimed, a fresh
    // occurrence may be submitted.
    let resend = QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({}), &opts)
        .await
        .unwrap();
    assert!(resend.is_some(), "key should be free after the claim");
}

// ---------------------------------------------------------------------------
// Test: expire_stale parks expired jobs and frees their keys
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn expire_stale_fails_expired_jobs(pool: PgPool) {
    let opts = SendOptions::singleton("daily-itinerary:t2:2026-06-02", 0);

    QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({}), &opts)
        .await
        .unwrap();

    let expired = QueueRepo::expire_stale(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap();
    assert_eq!(expired, 1, "the zero-expiry job should be swept");

    let claimed = QueueRepo::claim_next(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap();
    assert!(claimed.is_none(), "an expired job must not be claimable");
}

// ---------------------------------------------------------------------------
// Test: fail requeues with backoff and a cleared singleton key
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn fail_requeues_with_cleared_singleton_key(pool: PgPool) {
    let opts = SendOptions::singleton("event-reminder:e2", 300);

    QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({}), &opts)
        .await
        .unwrap();
    let job = QueueRepo::claim_next(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap()
        .unwrap();

    QueueRepo::fail(&pool, job.id).await.unwrap();

    let (state, singleton_key, retry_count): (String, Option<String>, i32) = sqlx::query_as(
        "SELECT state, singleton_key, retry_count FROM queue_jobs WHERE id = $1",
    )
    .bind(job.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(state, "created", "below the retry limit the job is requeued");
    assert_eq!(retry_count, 1);
    assert!(
        singleton_key.is_none(),
        "a retrying job must not block the next scheduled occurrence"
    );

    // Backoff: the job is not yet due.
    let reclaimed = QueueRepo::claim_next(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap();
    assert!(reclaimed.is_none(), "requeued job should wait out its backoff");
}

// ---------------------------------------------------------------------------
// Test: fail past the retry limit parks the job as failed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn fail_past_retry_limit_parks_job(pool: PgPool) {
    let opts = SendOptions {
        singleton_key: None,
        expire_secs: None,
        retry_limit: Some(0),
    };

    QueueRepo::send(&pool, QUEUE_NOTIFICATION_BATCH, &json!({}), &opts)
        .await
        .unwrap();
    let job = QueueRepo::claim_next(&pool, QUEUE_NOTIFICATION_BATCH)
        .await
        .unwrap()
        .unwrap();

    QueueRepo::fail(&pool, job.id).await.unwrap();

    let state: String = sqlx::query_scalar("SELECT state FROM queue_jobs WHERE id = $1")
        .bind(job.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(state, "failed");
}
