//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whether MoMo credentials are configured.
    pub momo_configured: bool,
    /// Gates in use. Succeeded and closed gates are not counted.
    pub open_gates: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "momo-gate".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        momo_configured: state.has_backend(),
        open_gates: state.gates.len(),
    })
}
