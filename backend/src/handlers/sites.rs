//! HTTP handler for the normalized mobile site contract

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{ResponseStatus, SiteSummary};

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SitesResponse {
    pub status: ResponseStatus,
    pub data: Vec<SiteSummary>,
}

/// List every configured site, sorted by name
pub async fn list_sites(State(state): State<AppState>) -> AppResult<Json<SitesResponse>> {
    let data = state.gauges.site_summaries().await?;
    Ok(Json(SitesResponse {
        status: ResponseStatus::Ok,
        data,
    }))
}
