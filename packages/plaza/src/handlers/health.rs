use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;
use crate::metrics::HealthStatus;

/// Health check endpoint - returns server status
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();
    let fanout = state.room.stats_snapshot();

    let status = if fanout.events_dropped == 0 {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthStatus {
        status: status.to_string(),
        connections: snapshot.connections.active,
        participants: state.room.participant_names().await,
        uptime_secs: snapshot.uptime_secs,
    })
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Metrics endpoint - returns detailed server metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "server": state.metrics.snapshot(),
        "fanout": state.room.stats_snapshot(),
    }))
}
