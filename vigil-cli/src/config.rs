use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_STATE_FILE: &str = "vigil-state.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Runtime settings for the monitor, read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Domains to watch.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Optional file with one domain per line. Blank lines and `#`
    /// comments are skipped; CSV rows use the first column.
    #[serde(default)]
    pub domains_file: Option<PathBuf>,

    /// Seconds between watch cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-probe timeout budget in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum simultaneous WHOIS queries.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between query dispatches in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Where last-known statuses are stored between runs.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Endpoint that receives alert events as JSON, in addition to the log.
    #[serde(default)]
    pub alert_webhook: Option<String>,

    /// Extra or replacement TLD -> WHOIS server entries.
    #[serde(default)]
    pub servers: HashMap<String, String>,

    /// Extra or replacement TLD -> fallback server entries.
    #[serde(default)]
    pub fallbacks: HashMap<String, String>,
}

fn default_interval_secs() -> u64 {
    1800
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    10
}

fn default_rate_limit_ms() -> u64 {
    100
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            domains_file: None,
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            rate_limit_ms: default_rate_limit_ms(),
            state_file: default_state_file(),
            alert_webhook: None,
            servers: HashMap::new(),
            fallbacks: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval_secs must be positive".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be positive".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be positive".to_string(),
            ));
        }

        if let Some(url) = &self.alert_webhook {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "alert_webhook must be an http(s) URL, got: {}",
                    url
                )));
            }
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }
}

/// Parse a domains file: one entry per line, `#` comments and blanks
/// skipped, CSV rows reduced to their first column.
pub fn parse_domains_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split(',').next().unwrap_or(line).trim().to_string())
        .filter(|domain| domain.contains('.'))
        .collect()
}
