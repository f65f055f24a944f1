//! River Gauge Backend
//!
//! Polls the USGS water-data API for a fixed set of river gauge sites,
//! caches the answers briefly, and serves a simplified JSON contract to the
//! mobile client.

use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use services::GaugeService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gauges: Arc<GaugeService>,
}

impl AppState {
    pub fn new(gauges: GaugeService) -> Self {
        Self {
            gauges: Arc::new(gauges),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
