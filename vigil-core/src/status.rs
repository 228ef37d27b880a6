use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized registration status of a monitored domain.
///
/// `Unknown` and `Error` are real verdicts, recorded and compared like any
/// other. Neither is sticky: every check re-evaluates from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    #[default]
    Unknown,
    Available,
    Registered,
    PendingDelete,
    Redemption,
    Inactive,
    Reserved,
    Error,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Unknown => "unknown",
            DomainStatus::Available => "available",
            DomainStatus::Registered => "registered",
            DomainStatus::PendingDelete => "pending delete",
            DomainStatus::Redemption => "redemption",
            DomainStatus::Inactive => "inactive",
            DomainStatus::Reserved => "reserved",
            DomainStatus::Error => "error",
        }
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(DomainStatus::Unknown),
            "available" => Ok(DomainStatus::Available),
            "registered" => Ok(DomainStatus::Registered),
            "pending delete" | "pending_delete" => Ok(DomainStatus::PendingDelete),
            "redemption" => Ok(DomainStatus::Redemption),
            "inactive" => Ok(DomainStatus::Inactive),
            "reserved" => Ok(DomainStatus::Reserved),
            "error" => Ok(DomainStatus::Error),
            _ => Err(format!("Unknown domain status: {}", s)),
        }
    }
}

/// A status transition observed for a monitored domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub domain: String,
    pub previous: DomainStatus,
    pub current: DomainStatus,
    pub at: DateTime<Utc>,
}

/// Compare a stored status against a fresh verdict.
///
/// Emits an event exactly when the two differ. Repeats of the same status
/// never alert; there is no dwell time and no dedup window.
pub fn detect_change(
    domain: &str,
    previous: DomainStatus,
    current: DomainStatus,
) -> Option<AlertEvent> {
    if previous == current {
        return None;
    }

    Some(AlertEvent {
        domain: domain.to_string(),
        previous,
        current,
        at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_event_when_status_unchanged() {
        assert!(detect_change("example.com", DomainStatus::Registered, DomainStatus::Registered)
            .is_none());
        assert!(detect_change("example.com", DomainStatus::Unknown, DomainStatus::Unknown)
            .is_none());
        assert!(detect_change("example.com", DomainStatus::Error, DomainStatus::Error).is_none());
    }

    #[test]
    fn event_carries_both_sides_of_the_transition() {
        let event = detect_change(
            "example.com",
            DomainStatus::Registered,
            DomainStatus::Available,
        )
        .unwrap();

        assert_eq!(event.domain, "example.com");
        assert_eq!(event.previous, DomainStatus::Registered);
        assert_eq!(event.current, DomainStatus::Available);
    }

    #[test]
    fn transitions_into_gaps_still_alert() {
        assert!(detect_change("example.com", DomainStatus::Registered, DomainStatus::Error)
            .is_some());
        assert!(detect_change("example.com", DomainStatus::Available, DomainStatus::Unknown)
            .is_some());
    }

    #[test]
    fn display_uses_human_strings() {
        assert_eq!(DomainStatus::PendingDelete.to_string(), "pending delete");
        assert_eq!(DomainStatus::Registered.to_string(), "registered");
    }

    #[test]
    fn from_str_accepts_both_forms() {
        assert_eq!(
            "pending delete".parse::<DomainStatus>().unwrap(),
            DomainStatus::PendingDelete
        );
        assert_eq!(
            "pending_delete".parse::<DomainStatus>().unwrap(),
            DomainStatus::PendingDelete
        );
        assert_eq!(
            "AVAILABLE".parse::<DomainStatus>().unwrap(),
            DomainStatus::Available
        );
        assert!("nonsense".parse::<DomainStatus>().is_err());
    }

    #[test]
    fn alert_event_serializes_snake_case() {
        let event = AlertEvent {
            domain: "example.com".to_string(),
            previous: DomainStatus::PendingDelete,
            current: DomainStatus::Available,
            at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["previous"], "pending_delete");
        assert_eq!(json["current"], "available");
        assert!(json["at"].is_string());
    }
}
