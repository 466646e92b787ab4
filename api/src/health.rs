//! Health endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ws::metrics::WsMetricsSnapshot;
use crate::ws::WsState;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the server answers.
    pub status: &'static str,

    /// Build identifier, empty when unavailable.
    pub git_commit: String,

    /// Registered connections.
    pub clients: usize,

    /// Time of the response.
    pub timestamp: DateTime<Utc>,

    /// Connection and broadcast counters.
    pub metrics: WsMetricsSnapshot,
}

/// Reports liveness and connection metrics.
pub async fn health(State(state): State<WsState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        git_commit: state.app_state.git_commit.to_string(),
        clients: state.registry.len().await,
        timestamp: Utc::now(),
        metrics: state.metrics.snapshot(),
    })
}
