use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bdx_exporter::{format_duration, Collector, Settings};
use bdx_sdk::prometheus::{format_exposition, PrometheusConfig, PrometheusExporter};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bdx-exporter")]
#[command(about = "Prometheus exporter for facility cooling and environmental telemetry")]
struct Args {
    /// Configuration file (TOML, YAML or JSON); ./.env and the environment override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "bdx_extract=trace")
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run one collection cycle, print the exposition to stdout and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::load(args.config.as_deref()).context("invalid configuration")?;
    if let Some(port) = args.port {
        settings.port = port;
    }
    if !settings.has_sources() {
        warn!("No sources configured; set TRH_URL, LIQUID_URL or CDU_URLS");
    }
    if settings.session.is_incomplete() {
        warn!("Session cookies are not fully configured; upstream pages may redirect to login");
    }

    let collector = Collector::from_settings(settings).context("failed to build HTTP clients")?;

    if args.once {
        collector.collect_once().await;
        print!("{}", format_exposition(&collector.registry().snapshot()));
        return Ok(());
    }

    let settings = collector.settings();
    let exporter = PrometheusExporter::new(
        PrometheusConfig::builder()
            .listen_addr(settings.listen_addr())
            .build(),
        collector.registry().clone(),
        collector.health().clone(),
    );
    let server = exporter
        .start_server()
        .await
        .with_context(|| format!("failed to listen on {}", settings.listen_addr()))?;
    info!(
        "Serving metrics on {} (interval {}, {} sources)",
        server.local_addr(),
        format_duration(settings.scrape_interval),
        collector.sources().len()
    );

    let scheduler = Arc::new(collector).start();

    shutdown_signal().await?;
    info!("Shutting down");

    scheduler.stop().await;
    server.abort();
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
