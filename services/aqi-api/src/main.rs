//! AQI API Server
//!
//! Serves colored AQI point features for the web map.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use aqi_api::config::ServiceConfig;
use aqi_api::state::AppState;

/// AQI API Server
#[derive(Parser, Debug)]
#[command(name = "aqi-api")]
#[command(about = "Air quality map server for NO2 rasters")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5000", env = "AQI_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "AQI_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// YAML config file
    #[arg(short, long, default_value = "config/aqi.yaml", env = "AQI_CONFIG")]
    config: PathBuf,

    /// NO2 GeoTIFF (overrides the config file)
    #[arg(long, env = "AQI_RASTER_PATH")]
    raster_path: Option<PathBuf>,

    /// SRCNN ONNX model (overrides the config file)
    #[arg(long, env = "AQI_MODEL_PATH")]
    model_path: Option<PathBuf>,
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

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    aqi_api::metrics::describe_metrics();

    info!("Starting AQI API server");

    let config = ServiceConfig::load(&args.config)?
        .with_overrides(args.raster_path, args.model_path);

    // Raster and model loading is blocking file I/O.
    let state = tokio::task::spawn_blocking(move || AppState::new(config, Some(prometheus_handle)))
        .await
        .context("Failed to initialize application state")?;
    let app = aqi_api::router(Arc::new(state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("AQI API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
