use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::Result;
use crate::status::AlertEvent;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives status-change events at the end of a check cycle.
///
/// Implementations must tolerate repeated delivery: scheduled and
/// on-demand checks can race and both observe the same transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &AlertEvent) -> Result<()>;
}

/// Writes alerts to the log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        info!(
            at = %event.at,
            "Alert for {}: {} -> {}",
            event.domain, event.previous, event.current
        );
        Ok(())
    }
}

/// POSTs each alert as JSON to a configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        let http = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .user_agent("Vigil/1.0 (Alert Webhook)")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        debug!(url = %self.url, domain = %event.domain, "Posting alert webhook");

        self.http
            .post(&self.url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
