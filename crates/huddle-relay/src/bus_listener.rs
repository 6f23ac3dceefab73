// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bus subscriber loop re-entering the relay's dispatch point.
//!
//! Events arriving off the bus were persisted and enriched by the
//! publishing process; this side only delivers.

use std::sync::Arc;

use huddle_core::traits::RelayBus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::relay::MessageRelay;

/// Subscribes once and dispatches every received event into the local
/// presence registry until the channel closes or shutdown is signalled.
pub fn spawn_bus_listener(
    relay: Arc<MessageRelay>,
    bus: Arc<dyn RelayBus>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut subscription = bus.subscribe();
    tokio::spawn(async move {
        info!("bus listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("bus listener stopping");
                    break;
                }
                received = subscription.recv() => match received {
                    Some(event) => relay.dispatch(&event).await,
                    None => {
                        warn!("bus channel closed, listener exiting");
                        break;
                    }
                }
            }
        }
    })
}
