mod config;

use clap::{Args, Parser};
use config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use webhook_router::errors::RelayError;

const METRICS_PREFIX: &str = "contextrelay";

#[derive(Parser)]
#[command(name = "contextrelay", version, about = "Webhook relay for GitHub, SendGrid, OpenProject and Slack")]
enum CliCommand {
    /// Run the webhook relay
    Relay(RelayArgs),
}

#[derive(Args)]
struct RelayArgs {
    #[arg(long)]
    config_file: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not install metrics exporter: {0}")]
    Metrics(String),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Relay(args) => run_relay(&args),
    };

    if let Err(e) = result {
        eprintln!("contextrelay: {e}");
        process::exit(1);
    }
}

fn run_relay(args: &RelayArgs) -> Result<(), CliError> {
    let mut config = Config::from_file(&args.config_file)?;
    let relay_config = config.relay_config(|name| std::env::var(name).ok())?;

    // Held for the lifetime of the process so buffered events are flushed on exit
    let _sentry = init_logging(&config.common.logging);
    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    tracing::info!(
        port = relay_config.listener.port,
        admin_port = relay_config.admin_listener.port,
        "starting relay"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(webhook_router::run(relay_config))?;
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;

    shared::metrics_defs::describe_all(webhook_router::metrics_defs::ALL_METRICS);
    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "statsd exporter installed"
    );
    Ok(())
}
