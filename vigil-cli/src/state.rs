use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vigil_core::{DomainReport, DomainStatus};

/// Stored verdict for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    pub status: DomainStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Last-known statuses, persisted as JSON between runs.
///
/// This is the only state the monitor keeps. Reports are folded in as
/// they arrive, so when checks race the later write wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBook {
    #[serde(default)]
    records: HashMap<String, DomainRecord>,
}

impl StatusBook {
    /// Load the book, starting empty when the file does not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No state file yet, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let book = serde_json::from_str(&content)?;
        Ok(book)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Stored status for a domain, `Unknown` when never checked.
    pub fn status_of(&self, domain: &str) -> DomainStatus {
        let key = domain.trim().to_lowercase();
        self.records
            .get(&key)
            .map(|record| record.status)
            .unwrap_or_default()
    }

    /// Fold cycle reports into the book. Reports that failed before
    /// producing a verdict leave their record untouched.
    pub fn apply(&mut self, reports: &[DomainReport]) {
        for report in reports {
            if report.error.is_some() {
                continue;
            }

            self.records.insert(
                report.domain.clone(),
                DomainRecord {
                    status: report.status,
                    last_checked: Some(Utc::now()),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report(domain: &str, status: DomainStatus) -> DomainReport {
        DomainReport {
            domain: domain.to_string(),
            previous: DomainStatus::Unknown,
            status,
            alert: None,
            server: None,
            error: None,
            duration_ms: 5,
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut book = StatusBook::default();
        book.apply(&[
            report("example.com", DomainStatus::Registered),
            report("example.it", DomainStatus::PendingDelete),
        ]);
        book.save(&path).unwrap();

        let loaded = StatusBook::load(&path).unwrap();
        assert_eq!(loaded.status_of("example.com"), DomainStatus::Registered);
        assert_eq!(loaded.status_of("example.it"), DomainStatus::PendingDelete);
        assert!(loaded
            .records
            .get("example.com")
            .unwrap()
            .last_checked
            .is_some());
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let book = StatusBook::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(book.status_of("example.com"), DomainStatus::Unknown);
    }

    #[test]
    fn later_writes_win() {
        let mut book = StatusBook::default();
        book.apply(&[report("example.com", DomainStatus::Registered)]);
        book.apply(&[report("example.com", DomainStatus::Available)]);
        assert_eq!(book.status_of("example.com"), DomainStatus::Available);
    }

    #[test]
    fn failed_reports_do_not_clobber() {
        let mut book = StatusBook::default();
        book.apply(&[report("example.com", DomainStatus::Registered)]);

        let mut failed = report("example.com", DomainStatus::Unknown);
        failed.error = Some("Invalid domain name: example.com".to_string());
        book.apply(&[failed]);

        assert_eq!(book.status_of("example.com"), DomainStatus::Registered);
    }

    #[test]
    fn gap_verdicts_are_recorded() {
        let mut book = StatusBook::default();
        book.apply(&[report("example.com", DomainStatus::Error)]);
        assert_eq!(book.status_of("example.com"), DomainStatus::Error);
    }

    #[test]
    fn lookup_is_lenient_about_case_and_whitespace() {
        let mut book = StatusBook::default();
        book.apply(&[report("example.com", DomainStatus::Available)]);
        assert_eq!(book.status_of("  EXAMPLE.COM "), DomainStatus::Available);
    }
}
