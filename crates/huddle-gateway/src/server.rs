// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the socket surface.

use std::sync::Arc;

use axum::{routing::get, Router};
use huddle_core::traits::MessageStore;
use huddle_core::HuddleError;
use huddle_relay::{MeetingTracker, MessageRelay, PresenceRegistry};
use huddle_storage::TranscriptWriter;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::rooms::RoomDirectory;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub relay: Arc<MessageRelay>,
    pub presence: Arc<PresenceRegistry>,
    pub store: Arc<dyn MessageStore>,
    pub meetings: Arc<MeetingTracker>,
    pub transcripts: Arc<TranscriptWriter>,
    pub rooms: Arc<RoomDirectory>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors ServerConfig from huddle-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Start the gateway HTTP/WebSocket server.
///
/// Binds to the configured host:port and serves:
/// - GET /health (unauthenticated liveness probe)
/// - GET /ws (socket surface; identity via query params)
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), HuddleError> {
    let app = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HuddleError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| HuddleError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_test_utils::MemoryStore;
    use std::time::Duration;

    fn test_state() -> GatewayState {
        let store = Arc::new(MemoryStore::new());
        let presence = Arc::new(PresenceRegistry::new());
        let relay = Arc::new(MessageRelay::new(
            Arc::clone(&presence),
            store.clone() as Arc<dyn MessageStore>,
            None,
            Duration::from_secs(5),
            64,
        ));
        GatewayState {
            relay,
            presence,
            store: store.clone(),
            meetings: Arc::new(MeetingTracker::new(store.clone(), store.clone())),
            transcripts: Arc::new(TranscriptWriter::new(store, 16)),
            rooms: Arc::new(RoomDirectory::new()),
            start_time: std::time::Instant::now(),
        }
    }

    #[test]
    fn gateway_state_is_clone() {
        let state = test_state();
        let _cloned = state.clone();
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 4100,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
