//! Integration tests for the event queries feeding the schedulers.
//!
//! Exercises the SQL against a real database to verify that:
//! - `list_on_local_date` compares dates in the trip's timezone, so a
//!   late-night UTC instant lands on the correct local day
//! - Soft-deleted events are excluded
//! - Results are ordered by start time
//! - `list_starting_between` excludes all-day and deleted events

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use tripful_core::types::{DbId, Timestamp};
use tripful_db::repositories::EventRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, phone: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (phone_number, display_name) VALUES ($1, 'Test User') RETURNING id",
    )
    .bind(phone)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_trip(pool: &PgPool, created_by: DbId, timezone: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO trips (name, destination, start_date, end_date, preferred_timezone, created_by) \
         VALUES ('Summer Trip', 'Lisbon', '2026-06-01', '2026-06-07', $1, $2) \
         RETURNING id",
    )
    .bind(timezone)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_event(
    pool: &PgPool,
    trip_id: DbId,
    created_by: DbId,
    name: &str,
    start_time: Timestamp,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO events (trip_id, created_by, name, start_time) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(trip_id)
    .bind(created_by)
    .bind(name)
    .bind(start_time)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn soft_delete_event(pool: &PgPool, event_id: DbId) {
    sqlx::query("UPDATE events SET deleted_at = NOW() WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await
        .unwrap();
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Test: date comparison happens in the trip's timezone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_on_local_date_uses_local_calendar_day(pool: PgPool) {
    let user = create_user(&pool, "+15550000001").await;
    let trip = create_trip(&pool, user, "America/New_York").await;

    // 2026-06-03 01:00 UTC is 2026-06-02 21:00 in New York: June 2 locally,
    // June 3 in UTC.
    create_event(&pool, trip, user, "Night Show", utc(2026, 6, 3, 1, 0)).await;

    let june_2 = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
    let june_3 = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();

    let on_june_2 = EventRepo::list_on_local_date(&pool, trip, "America/New_York", june_2)
        .await
        .unwrap();
    assert_eq!(on_june_2.len(), 1, "event belongs to its local date");
    assert_eq!(on_june_2[0].name, "Night Show");

    let on_june_3 = EventRepo::list_on_local_date(&pool, trip, "America/New_York", june_3)
        .await
        .unwrap();
    assert!(
        on_june_3.is_empty(),
        "event must not leak into the adjacent local date"
    );
}

// ---------------------------------------------------------------------------
// Test: soft-deleted events are excluded
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_on_local_date_excludes_soft_deleted(pool: PgPool) {
    let user = create_user(&pool, "+15550000002").await;
    let trip = create_trip(&pool, user, "UTC").await;

    create_event(&pool, trip, user, "Kept", utc(2026, 6, 2, 9, 0)).await;
    let deleted = create_event(&pool, trip, user, "Dropped", utc(2026, 6, 2, 10, 0)).await;
    soft_delete_event(&pool, deleted).await;

    let june_2 = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
    let events = EventRepo::list_on_local_date(&pool, trip, "UTC", june_2)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Kept");
}

// ---------------------------------------------------------------------------
// Test: results are ordered by start time
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_on_local_date_orders_by_start_time(pool: PgPool) {
    let user = create_user(&pool, "+15550000003").await;
    let trip = create_trip(&pool, user, "UTC").await;

    // Inserted out of order.
    create_event(&pool, trip, user, "City Tour", utc(2026, 6, 2, 14, 30)).await;
    create_event(&pool, trip, user, "Morning Coffee", utc(2026, 6, 2, 9, 0)).await;

    let june_2 = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
    let events = EventRepo::list_on_local_date(&pool, trip, "UTC", june_2)
        .await
        .unwrap();

    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Morning Coffee", "City Tour"]);
}

// ---------------------------------------------------------------------------
// Test: the reminder window query skips all-day and deleted events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_starting_between_excludes_all_day_and_deleted(pool: PgPool) {
    let user = create_user(&pool, "+15550000004").await;
    let trip = create_trip(&pool, user, "UTC").await;

    create_event(&pool, trip, user, "Timed", utc(2026, 6, 2, 12, 0)).await;
    let deleted = create_event(&pool, trip, user, "Deleted", utc(2026, 6, 2, 12, 10)).await;
    soft_delete_event(&pool, deleted).await;
    sqlx::query(
        "INSERT INTO events (trip_id, created_by, name, start_time, all_day) \
         VALUES ($1, $2, 'All Day', $3, TRUE)",
    )
    .bind(trip)
    .bind(user)
    .bind(utc(2026, 6, 2, 12, 20))
    .execute(&pool)
    .await
    .unwrap();

    let events =
        EventRepo::list_starting_between(&pool, utc(2026, 6, 2, 11, 55), utc(2026, 6, 2, 12, 30))
            .await
            .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Timed");
}
