//! Health check handlers

use axum::Json;
use serde::Serialize;
use shared::ResponseStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: ResponseStatus,
}

/// Health check endpoint handler
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: ResponseStatus::Ok,
    })
}
