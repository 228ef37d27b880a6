use std::time::Duration;

use thiserror::Error;

/// Failure of a single WHOIS probe against one server.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WHOIS query to {server} timed out after {}s", .timeout.as_secs())]
    Timeout { server: String, timeout: Duration },

    #[error("WHOIS server {server} unreachable: {source}")]
    Unreachable {
        server: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// The server the failed probe was aimed at.
    pub fn server(&self) -> &str {
        match self {
            TransportError::Timeout { server, .. } => server,
            TransportError::Unreachable { server, .. } => server,
        }
    }
}

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("WHOIS transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Alert delivery failed: {0}")]
    Notify(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_names_server_and_budget() {
        let err = TransportError::Timeout {
            server: "whois.nic.it".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "WHOIS query to whois.nic.it timed out after 10s"
        );
        assert_eq!(err.server(), "whois.nic.it");
    }

    #[test]
    fn unreachable_keeps_io_source() {
        let err = TransportError::Unreachable {
            server: "whois.example".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert!(err.to_string().contains("whois.example"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn transport_errors_convert() {
        let err: VigilError = TransportError::Timeout {
            server: "whois.example".to_string(),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert!(matches!(err, VigilError::Transport(_)));
    }
}
