/// Worker configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string (required).
    pub database_url: String,
    /// Daily itinerary scan interval in seconds (default: `900`).
    /// Must stay under the 31-minute morning window or trips can be missed.
    pub itinerary_scan_interval_secs: u64,
    /// Event reminder scan interval in seconds (default: `300`).
    /// Must stay under the 10-minute reminder window.
    pub event_reminder_scan_interval_secs: u64,
    /// Queue poll interval for both consumers in seconds (default: `2`).
    pub queue_poll_interval_secs: u64,
    /// SMS provider endpoint. When unset, messages are logged instead of
    /// delivered.
    pub sms_provider_url: Option<String>,
    /// Number of concurrent SMS delivery consumers (default: `3`).
    pub sms_deliver_concurrency: usize,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default   |
    /// |-------------------------------------|-----------|
    /// | `DATABASE_URL`                      | (required)|
    /// | `ITINERARY_SCAN_INTERVAL_SECS`      | `900`     |
    /// | `EVENT_REMINDER_SCAN_INTERVAL_SECS` | `300`     |
    /// | `QUEUE_POLL_INTERVAL_SECS`          | `2`       |
    /// | `SMS_PROVIDER_URL`                  | (unset)   |
    /// | `SMS_DELIVER_CONCURRENCY`           | `3`       |
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let itinerary_scan_interval_secs: u64 = std::env::var("ITINERARY_SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("ITINERARY_SCAN_INTERVAL_SECS must be a valid u64");

        let event_reminder_scan_interval_secs: u64 =
            std::env::var("EVENT_REMINDER_SCAN_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .expect("EVENT_REMINDER_SCAN_INTERVAL_SECS must be a valid u64");

        let queue_poll_interval_secs: u64 = std::env::var("QUEUE_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("QUEUE_POLL_INTERVAL_SECS must be a valid u64");

        let sms_provider_url = std::env::var("SMS_PROVIDER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let sms_deliver_concurrency: usize = std::env::var("SMS_DELIVER_CONCURRENCY")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("SMS_DELIVER_CONCURRENCY must be a valid usize");

        Self {
            database_url,
            itinerary_scan_interval_secs,
            event_reminder_scan_interval_secs,
            queue_poll_interval_secs,
            sms_provider_url,
            sms_deliver_concurrency,
        }
    }
}
