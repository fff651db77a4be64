//! Postgres-backed job queue with at-least-once delivery.
//!
//! Jobs live in the `queue_jobs` table. Producers submit with
//! [`QueueRepo::send`] (optionally deduplicated by a singleton key) or
//! [`QueueRepo::insert_batch`]; consumers run [`run_queue`], which claims
//! jobs with `FOR UPDATE SKIP LOCKED` so any number of worker processes can
//! poll the same queue without double-dispatch.
//!
//! Delivery is at-least-once: a job whose handler fails (or whose worker
//! dies before completing it) is retried with exponential backoff up to its
//! retry limit. Handlers that produce user-visible side effects must be
//! idempotent on their own.

pub mod job;
pub mod repo;
pub mod worker;

pub use job::{QueueJob, SendOptions};
pub use repo::QueueRepo;
pub use worker::{run_queue, HandlerError};

/// Fan-out jobs consumed by the batch dispatcher.
pub const QUEUE_NOTIFICATION_BATCH: &str = "notification/batch";

/// Per-recipient SMS delivery jobs.
pub const QUEUE_NOTIFICATION_DELIVER: &str = "notification/deliver";
