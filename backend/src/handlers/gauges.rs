//! HTTP handlers for raw gauge endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{GaugeRecord, ResponseStatus};

use crate::AppState;

/// Latest reading for the primary site, or `no_data`
#[derive(Debug, Serialize)]
pub struct LatestGaugeResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GaugeRecord>,
}

/// Every site that currently has a reading
#[derive(Debug, Serialize)]
pub struct AllGaugesResponse {
    pub status: ResponseStatus,
    pub count: usize,
    pub data: Vec<GaugeRecord>,
}

/// Get the latest reading for the first configured site
pub async fn get_primary_latest(State(state): State<AppState>) -> Json<LatestGaugeResponse> {
    let response = match state.gauges.primary_latest().await {
        Some(record) => LatestGaugeResponse {
            status: ResponseStatus::Ok,
            data: Some(record),
        },
        None => LatestGaugeResponse {
            status: ResponseStatus::NoData,
            data: None,
        },
    };
    Json(response)
}

/// List all gauges with a reading, in configured site order
pub async fn list_all_gauges(State(state): State<AppState>) -> Json<AllGaugesResponse> {
    let data = state.gauges.all_gauges().await;
    tracing::debug!(count = data.len(), "resolved gauges with readings");

    Json(AllGaugesResponse {
        status: ResponseStatus::Ok,
        count: data.len(),
        data,
    })
}
