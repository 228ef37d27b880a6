use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::checker::DomainChecker;
use crate::notify::Notifier;
use crate::status::{AlertEvent, DomainStatus};

/// A domain under watch, paired with its last stored status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedDomain {
    pub name: String,
    #[serde(default)]
    pub status: DomainStatus,
}

impl WatchedDomain {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: DomainStatus::Unknown,
        }
    }

    pub fn with_status(mut self, status: DomainStatus) -> Self {
        self.status = status;
        self
    }
}

/// Per-domain result of one monitoring cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub previous: DomainStatus,
    pub status: DomainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Set when the check could not run at all (bad name). The previous
    /// status is retained in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Runs one monitoring cycle across the watched set.
///
/// Checks are dispatched concurrently up to a bound, with an optional
/// politeness delay per dispatch. Failures stay contained to their own
/// domain: a dead registry or a bad config entry never aborts the batch.
pub struct CheckRunner {
    checker: DomainChecker,
    concurrency: usize,
    rate_limit_delay: Duration,
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRunner {
    pub fn new() -> Self {
        Self {
            checker: DomainChecker::new(),
            concurrency: 10,
            rate_limit_delay: Duration::from_millis(100),
            notifiers: Vec::new(),
        }
    }

    pub fn with_checker(mut self, checker: DomainChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Register an alert sink. Sinks run in registration order and their
    /// failures are logged, never propagated.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Check every watched domain once. One report per input, in
    /// completion order.
    pub async fn run_cycle(&self, watched: &[WatchedDomain]) -> Vec<DomainReport> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        debug!(
            total = watched.len(),
            concurrency = self.concurrency,
            "Starting check cycle"
        );

        let reports: Vec<DomainReport> = stream::iter(watched.iter().cloned())
            .map(|entry| {
                let semaphore = semaphore.clone();
                let rate_limit_delay = self.rate_limit_delay;
                let checker = &self.checker;

                async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => return error_report(&entry, "check cancelled"),
                    };

                    // Rate limiting delay
                    if !rate_limit_delay.is_zero() {
                        sleep(rate_limit_delay).await;
                    }

                    match checker.check(&entry.name, entry.status).await {
                        Ok(outcome) => DomainReport {
                            domain: outcome.domain,
                            previous: entry.status,
                            status: outcome.status,
                            alert: outcome.alert,
                            server: outcome.server,
                            error: None,
                            duration_ms: outcome.duration_ms,
                        },
                        Err(e) => {
                            warn!(domain = %entry.name, error = %e, "Check could not run");
                            error_report(&entry, &e.to_string())
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        self.dispatch_alerts(&reports).await;

        reports
    }

    async fn dispatch_alerts(&self, reports: &[DomainReport]) {
        for report in reports {
            let Some(alert) = &report.alert else { continue };

            info!(
                domain = %alert.domain,
                previous = %alert.previous,
                current = %alert.current,
                "Domain status changed"
            );

            for notifier in &self.notifiers {
                if let Err(e) = notifier.notify(alert).await {
                    warn!(domain = %alert.domain, error = %e, "Alert notifier failed");
                }
            }
        }
    }
}

fn error_report(entry: &WatchedDomain, error: &str) -> DomainReport {
    DomainReport {
        domain: entry.name.clone(),
        previous: entry.status,
        status: entry.status,
        alert: None,
        server: None,
        error: Some(error.to_string()),
        duration_ms: 0,
    }
}
