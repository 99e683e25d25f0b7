//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use randomizer_service::dto::HealthResponse;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    pub ready: bool,
    pub store_readable: bool,
    pub open_panels: usize,
    pub open_settings: usize,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
///
/// Ready once the settings blob can be read.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let store_readable = state
        .service_context()
        .gateway()
        .load_settings()
        .await
        .is_some();

    let body = ReadinessResponse {
        ready: store_readable,
        store_readable,
        open_panels: state.panels().len(),
        open_settings: state.settings().len(),
    };
    let status = if store_readable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
