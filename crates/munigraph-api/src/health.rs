use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
    pub nodes: usize,
    pub edges: usize,
    pub active_until: i32,
    pub built_at: DateTime<Utc>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshot();
    let graph = &snapshot.graph;
    let status = if graph.is_empty() { "degraded" } else { "healthy" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.source_name().to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        active_until: graph.active_until(),
        built_at: snapshot.built_at,
    })
}

/// Liveness probe.
pub async fn liveness() -> &'static str {
    "OK"
}
