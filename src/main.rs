//! Filmboard Server
//!
//! Run with: cargo run --bin filmboard
//!
//! # Configuration
//!
//! Settings come from the config file (see `filmboard-cli config`) with
//! environment overrides:
//! - `MONGO_URI`: Connection string (required unless `--demo`)
//! - `FILMBOARD_DATABASE` / `FILMBOARD_COLLECTION`: Collection to read
//! - `FILMBOARD_CONNECTION`: `shared` or `per_refresh`
//! - `FILMBOARD_REFRESH_INTERVAL_SECS`: Refresh period (default: one week)
//! - `FILMBOARD_API_HOST` / `FILMBOARD_API_PORT`: Bind address (default: 0.0.0.0:8050)
//! - `RUST_LOG`: Log filter (default: filmboard=info,tower_http=info)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use filmboard::api::{serve, AppState};
use filmboard::config::Config;
use filmboard::pipeline::{Dashboard, RefreshScheduler};
use filmboard::source::{demo_records, DocumentSource, MongoSource, StaticSource};
use filmboard::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "filmboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live database dashboard server")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve a built-in sample collection instead of connecting to a database
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load_default(args.config.as_deref())?;
    config.validate()?;
    init_tracing(&config.logging)?;

    tracing::info!("Starting Filmboard v{}", env!("CARGO_PKG_VERSION"));

    let source: Arc<dyn DocumentSource> = if args.demo {
        tracing::info!("Demo mode: serving the built-in sample collection");
        Arc::new(StaticSource::new(demo_records()).with_name("demo.Films"))
    } else {
        Arc::new(MongoSource::from_config(&config.source)?)
    };

    // The dashboard is useless without a reachable source
    let sample = source
        .sample(config.source.sample_size)
        .await
        .with_context(|| format!("Cannot reach collection {}", source.name()))?;
    tracing::info!(
        collection = %source.name(),
        sample = sample.len(),
        "Connection verified"
    );

    let dashboard = Arc::new(Dashboard::from_config(Arc::clone(&source), &config));

    let scheduler = Arc::new(RefreshScheduler::new(Arc::clone(&dashboard), &config.refresh));
    let scheduler_handle = Arc::clone(&scheduler).start();

    let state = AppState::new(dashboard, config.api.clone())
        .with_sample_size(config.source.sample_size);
    let served = serve(state).await;

    tracing::info!("Stopping refresh scheduler...");
    scheduler.stop();
    if let Err(e) = scheduler_handle.await {
        tracing::warn!(error = %e, "Refresh scheduler task ended abnormally");
    }

    source.shutdown().await;
    served?;

    tracing::info!("Filmboard stopped");
    Ok(())
}
