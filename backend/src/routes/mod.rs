//! Route definitions for the River Gauge backend

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/gauges", gauge_routes())
        .route("/sites", get(handlers::list_sites))
}

/// Raw gauge routes
fn gauge_routes() -> Router<AppState> {
    Router::new()
        .route("/texas/latest", get(handlers::get_primary_latest))
        .route("/all", get(handlers::list_all_gauges))
}
