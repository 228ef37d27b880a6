mod config;
mod output;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_core::{
    normalize_domain, CheckRunner, DomainChecker, LogNotifier, RegistryDirectory, WatchedDomain,
    WebhookNotifier, WhoisTransport,
};

use config::Config;
use output::OutputFormat;
use state::StatusBook;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Domain status monitor - polls WHOIS registries and alerts on changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(short, long, default_value = "vigil.toml")]
    config: PathBuf,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one domain now and update its stored status
    Check {
        /// Domain name to check
        domain: String,
    },
    /// Check every configured domain once
    Run,
    /// Keep checking every configured domain on the configured interval
    Watch,
    /// List the WHOIS servers the directory would consult
    Servers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let format: OutputFormat = cli.format.parse().unwrap_or_default();

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    config.validate()?;

    match cli.command {
        Commands::Check { domain } => check_command(&config, &domain, format).await,
        Commands::Run => run_command(&config, format).await,
        Commands::Watch => watch_command(&config, format).await,
        Commands::Servers => servers_command(&config, format),
    }
}

async fn check_command(config: &Config, domain: &str, format: OutputFormat) -> anyhow::Result<()> {
    let domain = normalize_domain(domain)?;

    let mut book = StatusBook::load(config.state_path())?;
    let previous = book.status_of(&domain);

    let runner = build_runner(config);
    let watched = vec![WatchedDomain::new(&domain).with_status(previous)];
    let reports = runner.run_cycle(&watched).await;

    book.apply(&reports);
    book.save(config.state_path())?;

    println!("{}", output::render_reports(&reports, format)?);
    Ok(())
}

async fn run_command(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let mut book = StatusBook::load(config.state_path())?;
    let watched = watched_domains(config, &book)?;

    if watched.is_empty() {
        anyhow::bail!("no domains configured; set `domains` or `domains_file` in the config");
    }

    let runner = build_runner(config);
    let reports = runner.run_cycle(&watched).await;

    book.apply(&reports);
    book.save(config.state_path())?;

    println!("{}", output::render_reports(&reports, format)?);
    Ok(())
}

async fn watch_command(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let interval = config.interval();
    tracing::info!(interval_secs = interval.as_secs(), "Starting watch loop");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = run_command(config, format).await {
                    tracing::warn!(error = %e, "Check cycle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down watch loop");
                return Ok(());
            }
        }
    }
}

fn servers_command(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let directory = build_directory(config);
    println!("{}", output::render_servers(&directory, format)?);
    Ok(())
}

/// The monitored set: inline config entries plus the optional domains
/// file, deduplicated, each paired with its stored status.
fn watched_domains(config: &Config, book: &StatusBook) -> anyhow::Result<Vec<WatchedDomain>> {
    let mut names = config.domains.clone();

    if let Some(path) = &config.domains_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading domains file {}", path.display()))?;
        names.extend(config::parse_domains_list(&content));
    }

    names.sort();
    names.dedup();

    Ok(names
        .into_iter()
        .map(|name| {
            let status = book.status_of(&name);
            WatchedDomain::new(&name).with_status(status)
        })
        .collect())
}

fn build_directory(config: &Config) -> RegistryDirectory {
    let mut directory = RegistryDirectory::new();
    for (tld, server) in &config.servers {
        directory = directory.with_server(tld, server);
    }
    for (tld, server) in &config.fallbacks {
        directory = directory.with_fallback(tld, server);
    }
    directory
}

fn build_runner(config: &Config) -> CheckRunner {
    let checker = DomainChecker::new()
        .with_directory(build_directory(config))
        .with_transport(WhoisTransport::new().with_timeout(config.timeout()));

    let mut runner = CheckRunner::new()
        .with_checker(checker)
        .with_concurrency(config.concurrency)
        .with_rate_limit(config.rate_limit())
        .with_notifier(Arc::new(LogNotifier::new()));

    if let Some(url) = &config.alert_webhook {
        runner = runner.with_notifier(Arc::new(WebhookNotifier::new(url)));
    }

    runner
}
