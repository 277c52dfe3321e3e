//! /status, /agents handlers — server and session visibility.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

// ── /status ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub active_downloads: usize,
    pub max_concurrent: usize,
    pub connected_agents: usize,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        active_downloads: state.reservations.count(),
        max_concurrent: state.gate.max_concurrent(),
        connected_agents: state.sessions.connected_count(),
    })
}

// ── /agents ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AgentEntry {
    pub device_id: String,
    pub public_address: String,
    pub connected: bool,
}

pub async fn handle_agents(State(state): State<ApiState>) -> Json<Vec<AgentEntry>> {
    let agents = state
        .sessions
        .all_devices()
        .into_iter()
        .map(|device| {
            let connected = !state
                .sessions
                .connection_ids_for(std::slice::from_ref(&device.id))
                .is_empty();
            AgentEntry {
                device_id: device.id,
                public_address: device.public_address,
                connected,
            }
        })
        .collect();
    Json(agents)
}
