//! SMS provider abstraction.
//!
//! [`SmsSender`] is the seam between the delivery consumer and the outside
//! world. Production uses [`HttpSmsSender`] against a provider webhook;
//! development environments without credentials use [`LogSmsSender`], which
//! only logs.

use std::time::Duration;

use async_trait::async_trait;

/// Per-attempt request timeout for the HTTP provider.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SMS delivery failures.
///
/// A failed attempt is not retried here; the queue's retry policy owns
/// backoff and the retry limit.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("sms request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("sms provider returned HTTP {0}")]
    HttpStatus(u16),
}

/// Sends one text message to one phone number.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_text(&self, phone_number: &str, message: &str) -> Result<(), SmsError>;
}

// ---------------------------------------------------------------------------
// HttpSmsSender
// ---------------------------------------------------------------------------

/// Delivers messages by POSTing JSON to a provider endpoint.
pub struct HttpSmsSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSmsSender {
    /// Panics if the HTTP client cannot be constructed, which only happens
    /// on a broken TLS backend and should fail startup.
    pub fn new(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build SMS HTTP client");
        Self { client, endpoint }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send_text(&self, phone_number: &str, message: &str) -> Result<(), SmsError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "to": phone_number,
                "message": message,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SmsError::HttpStatus(status.as_u16()));
        }

        tracing::debug!(phone_number = %phone_number, "SMS accepted by provider");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogSmsSender
// ---------------------------------------------------------------------------

/// Development sender: logs instead of delivering.
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_text(&self, phone_number: &str, message: &str) -> Result<(), SmsError> {
        tracing::info!(
            phone_number = %phone_number,
            message = %message,
            "SMS (log only, no provider configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let sender = LogSmsSender;
        assert!(sender.send_text("+15550001111", "hello").await.is_ok());
    }

    #[test]
    fn http_status_error_names_the_code() {
        let err = SmsError::HttpStatus(429);
        assert_eq!(err.to_string(), "sms provider returned HTTP 429");
    }

    #[test]
    fn http_sender_builds_with_timeout() {
        let _ = HttpSmsSender::new("http://localhost:9/sms".to_string());
    }
}
