//! River Gauge Backend - Server
//!
//! Aggregates USGS gage-height readings for a fixed set of river sites and
//! serves them to the mobile client.

use std::net::SocketAddr;

use river_gauge_backend::{create_app, AppState, Config, GaugeService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gauge_server=debug,river_gauge_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting River Gauge Server");
    tracing::info!("Environment: {}", config.environment);

    let gauges = GaugeService::from_config(&config)?;
    tracing::info!(
        sites = gauges.sites().len(),
        ttl_seconds = config.cache.ttl_seconds,
        upstream = %config.usgs.base_url,
        "Gauge service ready"
    );

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);

    // Create application state
    let state = AppState::new(gauges);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
