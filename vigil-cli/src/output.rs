use serde::Serialize;

use vigil_core::{DomainReport, RegistryDirectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" | "pretty" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub fn render_reports(reports: &[DomainReport], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Human => Ok(reports
            .iter()
            .map(report_line)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn report_line(report: &DomainReport) -> String {
    let mut line = match &report.error {
        Some(error) => format!("{:<32} check failed: {}", report.domain, error),
        None => format!("{:<32} {}", report.domain, report.status),
    };

    if let Some(alert) = &report.alert {
        line.push_str(&format!("  (was {})", alert.previous));
    }
    if let Some(server) = &report.server {
        line.push_str(&format!("  via {}", server));
    }
    line.push_str(&format!("  [{}ms]", report.duration_ms));
    line
}

#[derive(Serialize)]
struct ServerEntry {
    tld: String,
    server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<String>,
}

pub fn render_servers(
    directory: &RegistryDirectory,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let entries: Vec<ServerEntry> = directory
        .known_tlds()
        .into_iter()
        .filter_map(|tld| {
            directory.server_for(&tld).map(|server| ServerEntry {
                server: server.to_string(),
                fallback: directory.fallback_for(&tld).map(String::from),
                tld,
            })
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
        OutputFormat::Human => Ok(entries
            .iter()
            .map(|entry| match &entry.fallback {
                Some(fallback) => {
                    format!("{:<12} {}  (fallback: {})", entry.tld, entry.server, fallback)
                }
                None => format!("{:<12} {}", entry.tld, entry.server),
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::DomainStatus;

    fn report() -> DomainReport {
        DomainReport {
            domain: "example.com".to_string(),
            previous: DomainStatus::Registered,
            status: DomainStatus::Available,
            alert: vigil_core::detect_change(
                "example.com",
                DomainStatus::Registered,
                DomainStatus::Available,
            ),
            server: Some("whois.verisign-grs.com".to_string()),
            error: None,
            duration_ms: 42,
        }
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn human_line_shows_transition_and_server() {
        let text = render_reports(&[report()], OutputFormat::Human).unwrap();
        assert!(text.contains("example.com"));
        assert!(text.contains("available"));
        assert!(text.contains("(was registered)"));
        assert!(text.contains("via whois.verisign-grs.com"));
    }

    #[test]
    fn json_reports_parse_back() {
        let text = render_reports(&[report()], OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["domain"], "example.com");
        assert_eq!(parsed[0]["status"], "available");
        assert_eq!(parsed[0]["previous"], "registered");
    }

    #[test]
    fn servers_listing_includes_fallbacks() {
        let directory = RegistryDirectory::new();
        let text = render_servers(&directory, OutputFormat::Human).unwrap();
        assert!(text.contains("whois.verisign-grs.com"));
        assert!(text.contains("(fallback: whois.registro.it)"));
    }
}
