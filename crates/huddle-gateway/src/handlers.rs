// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the gateway's non-socket endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub connections: usize,
}

/// Liveness probe with connection count and uptime.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        connections: state.presence.connection_count(),
    })
}
