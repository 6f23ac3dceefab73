// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `huddle serve` command implementation.
//!
//! Wires the storage, bus, relay, and gateway layers together and runs the
//! server until a shutdown signal arrives. With the bus disabled the relay
//! degrades to single-process synchronous delivery.

use std::sync::Arc;
use std::time::Duration;

use huddle_bus::BroadcastBus;
use huddle_config::model::HuddleConfig;
use huddle_core::traits::{CounterStore, MessageStore, RelayBus};
use huddle_core::HuddleError;
use huddle_gateway::{GatewayState, RoomDirectory, ServerConfig};
use huddle_relay::{spawn_bus_listener, MeetingTracker, MessageRelay, PresenceRegistry};
use huddle_storage::{Database, SqliteStore, TranscriptWriter};
use tracing::info;

use crate::shutdown;

/// Runs the `huddle serve` command.
pub async fn run_serve(config: HuddleConfig) -> Result<(), HuddleError> {
    init_tracing(&config.server.log_level);

    info!("starting huddle serve");

    let db = Arc::new(
        Database::open(&config.storage.database_path, config.storage.wal_mode).await?,
    );
    let sqlite = Arc::new(SqliteStore::new(db));
    let store: Arc<dyn MessageStore> = sqlite.clone();
    let counters: Arc<dyn CounterStore> = sqlite;

    let bus: Option<Arc<dyn RelayBus>> = if config.bus.enabled {
        info!(capacity = config.bus.channel_capacity, "relay bus enabled");
        Some(Arc::new(BroadcastBus::new(config.bus.channel_capacity)))
    } else {
        info!("relay bus disabled, single-process delivery");
        None
    };

    let presence = Arc::new(PresenceRegistry::new());
    let relay = Arc::new(MessageRelay::new(
        Arc::clone(&presence),
        Arc::clone(&store),
        bus.clone(),
        Duration::from_secs(config.relay.dedup_ttl_secs),
        config.relay.dedup_capacity,
    ));

    let cancel = shutdown::install_signal_handler();

    let bus_listener = bus
        .as_ref()
        .map(|bus| spawn_bus_listener(Arc::clone(&relay), Arc::clone(bus), cancel.clone()));

    let transcripts = Arc::new(TranscriptWriter::new(
        Arc::clone(&store),
        config.storage.transcript_buffer_max,
    ));
    let flusher =
        transcripts.spawn_flusher(config.storage.transcript_flush_secs, cancel.clone());

    let state = GatewayState {
        relay,
        presence,
        store: Arc::clone(&store),
        meetings: Arc::new(MeetingTracker::new(counters, store)),
        transcripts,
        rooms: Arc::new(RoomDirectory::new()),
        start_time: std::time::Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let result = huddle_gateway::start_server(&server_config, state, cancel.clone()).await;

    // Stop background tasks even if the server errored out early.
    cancel.cancel();
    if let Some(listener) = bus_listener {
        let _ = listener.await;
    }
    let _ = flusher.await;

    info!("huddle serve shutdown complete");
    result
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("huddle={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
