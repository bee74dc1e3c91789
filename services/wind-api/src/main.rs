//! Wind API Server
//!
//! Serves GFS 10 m wind forecasts as vector tiles and point lookups.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grid_processor::SamplingMethod;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wind_api::config::ServiceConfig;
use wind_api::state::AppState;
use wind_api::sweeper::spawn_sweeper;

/// Wind API Server
#[derive(Parser, Debug)]
#[command(name = "wind-api")]
#[command(about = "GFS wind forecast tiles and point lookups")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WIND_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WIND_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// YAML configuration file
    #[arg(short, long, default_value = "config/wind-api.yaml", env = "WIND_CONFIG")]
    config: PathBuf,

    /// Upstream URL template (overrides the config file)
    #[arg(long, env = "WIND_GFS_URL_TEMPLATE")]
    url_template: Option<String>,

    /// Point sampling strategy: idw or bicubic (overrides the config file)
    #[arg(long, env = "WIND_SAMPLING")]
    sampling: Option<SamplingMethod>,

    /// Seconds between cache sweeps (overrides the config file)
    #[arg(long, env = "WIND_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting wind API server");

    let mut config = ServiceConfig::load(&args.config)?;
    if let Some(template) = args.url_template {
        config.fetch.url_template = template;
    }
    if let Some(sampling) = args.sampling {
        config.sampling = sampling;
    }
    if let Some(secs) = args.sweep_interval_secs {
        config.cache.sweep_interval_secs = secs;
    }

    let state = Arc::new(AppState::from_config(&config, Some(prometheus_handle))?);

    // Shutdown signal
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let sweeper = spawn_sweeper(
        state.service.cache().clone(),
        config.sweep_interval(),
        shutdown_tx.subscribe(),
    );

    let app = wind_api::build_router(Arc::clone(&state));

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let signal_tx = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
            signal_tx.send(()).ok();
        })
        .await
        .context("Server failed")?;

    sweeper.await.ok();
    info!("Wind API stopped");
    Ok(())
}
