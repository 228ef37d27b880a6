use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::{normalize_domain, tld};
use crate::error::{Result, VigilError};
use crate::status::{detect_change, AlertEvent, DomainStatus};
use crate::whois::{Classifier, RegistryDirectory, WhoisTransport};

/// Outcome of a single domain check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub domain: String,
    pub status: DomainStatus,
    /// Present when the status moved away from the stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertEvent>,
    /// The WHOIS host the verdict came through. None when the TLD has no
    /// directory entry and nothing was asked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub duration_ms: u64,
}

/// Single-domain check pipeline: directory, transport, classifier,
/// transition detection. Every collaborator is injected, so tests can
/// point the checker at local stand-in servers.
#[derive(Debug, Clone)]
pub struct DomainChecker {
    directory: RegistryDirectory,
    transport: WhoisTransport,
    classifier: Classifier,
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainChecker {
    pub fn new() -> Self {
        Self {
            directory: RegistryDirectory::new(),
            transport: WhoisTransport::new(),
            classifier: Classifier::new(),
        }
    }

    pub fn with_directory(mut self, directory: RegistryDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_transport(mut self, transport: WhoisTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Check one domain and compare the verdict with its stored status.
    ///
    /// Fails only on invalid input. Every other problem settles into the
    /// verdict itself: a TLD without a directory entry yields `Unknown`
    /// without touching the network, and transport failures (after the
    /// registry's single fallback host, when it has one) yield `Error`.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn check(&self, domain: &str, previous: DomainStatus) -> Result<CheckOutcome> {
        let start = Instant::now();

        let domain = normalize_domain(domain)?;
        let tld = tld(&domain).ok_or_else(|| VigilError::InvalidDomain(domain.clone()))?;

        let Some(server) = self.directory.server_for(tld) else {
            debug!(tld = %tld, "No WHOIS server mapping, leaving status unknown");
            return Ok(CheckOutcome {
                status: DomainStatus::Unknown,
                alert: detect_change(&domain, previous, DomainStatus::Unknown),
                server: None,
                duration_ms: start.elapsed().as_millis() as u64,
                domain,
            });
        };

        // Primary probe, then the registry's one fallback host. Never more.
        let mut via = server.to_string();
        let probe = match self.transport.query(&via, &domain).await {
            Ok(raw) => Ok(raw),
            Err(primary_err) => match self.directory.fallback_for(tld) {
                Some(fallback) => {
                    warn!(
                        server = %via,
                        error = %primary_err,
                        "Primary WHOIS query failed, trying fallback"
                    );
                    via = fallback.to_string();
                    self.transport.query(&via, &domain).await
                }
                None => Err(primary_err),
            },
        };

        let status = match probe {
            Ok(raw) => self.classifier.classify(tld, &raw),
            Err(err) => {
                warn!(server = %via, error = %err, "WHOIS query failed, marking status error");
                DomainStatus::Error
            }
        };

        let alert = detect_change(&domain, previous, status);

        Ok(CheckOutcome {
            status,
            alert,
            server: Some(via),
            duration_ms: start.elapsed().as_millis() as u64,
            domain,
        })
    }
}
