use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripful_notify::{
    DailyItineraryScheduler, EventReminderScheduler, HttpSmsSender, LogSmsSender, SmsSender,
};
use tripful_queue::{run_queue, QUEUE_NOTIFICATION_BATCH, QUEUE_NOTIFICATION_DELIVER};

mod config;
mod handlers;

use config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tripful_worker=debug,tripful_notify=debug,tripful_queue=debug,tripful_db=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        itinerary_scan_secs = config.itinerary_scan_interval_secs,
        event_reminder_scan_secs = config.event_reminder_scan_interval_secs,
        queue_poll_secs = config.queue_poll_interval_secs,
        sms_deliver_concurrency = config.sms_deliver_concurrency,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = tripful_db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    tripful_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    tripful_db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- SMS sender ---
    let sms_sender: Arc<dyn SmsSender> = match &config.sms_provider_url {
        Some(url) => {
            tracing::info!(endpoint = %url, "Using HTTP SMS provider");
            Arc::new(HttpSmsSender::new(url.clone()))
        }
        None => {
            tracing::warn!("SMS_PROVIDER_URL not set, SMS messages will only be logged");
            Arc::new(LogSmsSender)
        }
    };

    let cancel = CancellationToken::new();
    let poll_interval = Duration::from_secs(config.queue_poll_interval_secs);
    let mut tasks = Vec::new();

    // --- Schedulers ---
    let itinerary = DailyItineraryScheduler::new(
        pool.clone(),
        Duration::from_secs(config.itinerary_scan_interval_secs),
    );
    let itinerary_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        itinerary.run(itinerary_cancel).await;
    }));

    let reminders = EventReminderScheduler::new(
        pool.clone(),
        Duration::from_secs(config.event_reminder_scan_interval_secs),
    );
    let reminders_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        reminders.run(reminders_cancel).await;
    }));

    // --- Batch dispatcher ---
    {
        let pool = pool.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            let handler_pool = pool.clone();
            run_queue(
                pool,
                QUEUE_NOTIFICATION_BATCH,
                poll_interval,
                cancel,
                move |job| handlers::notification_batch(handler_pool.clone(), job),
            )
            .await;
        }));
    }

    // --- SMS delivery consumers ---
    //
    // Several consumers poll the same queue; SKIP LOCKED claiming keeps
    // them from stepping on each other.
    for _ in 0..config.sms_deliver_concurrency {
        let pool = pool.clone();
        let cancel = cancel.clone();
        let sender = Arc::clone(&sms_sender);
        tasks.push(tokio::spawn(async move {
            run_queue(
                pool,
                QUEUE_NOTIFICATION_DELIVER,
                poll_interval,
                cancel,
                move |job| handlers::sms_deliver(Arc::clone(&sender), job),
            )
            .await;
        }));
    }

    tracing::info!("Worker started (itinerary + reminder schedulers, batch + SMS consumers)");

    shutdown_signal().await;

    // --- Graceful shutdown ---
    cancel.cancel();
    for task in tasks {
        let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
