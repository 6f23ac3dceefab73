// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process broadcast implementation of the relay bus.
//!
//! Events are serialized to JSON at the publish boundary so every subscriber
//! decodes independently, mirroring how an external pub/sub channel would
//! carry them. Subscribers attached after a publish never see it.

use async_trait::async_trait;
use huddle_core::traits::{BusSubscription, RelayBus};
use huddle_core::{HuddleError, RelayEvent};
use tokio::sync::broadcast;
use tracing::debug;

/// Relay bus over a tokio broadcast channel.
///
/// Cloning shares the underlying channel. A publish with zero active
/// subscribers succeeds and the event is discarded, matching fire-and-forget
/// relay semantics.
#[derive(Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<String>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl RelayBus for BroadcastBus {
    async fn publish(&self, event: &RelayEvent) -> Result<(), HuddleError> {
        let raw = serde_json::to_string(event).map_err(|e| HuddleError::Bus {
            message: "failed to encode relay event".to_owned(),
            source: Some(Box::new(e)),
        })?;
        // A send error only means no subscriber is listening right now.
        if self.tx.send(raw).is_err() {
            debug!(kind = event.kind(), "published with no active subscribers");
        }
        Ok(())
    }

    fn subscribe(&self) -> BusSubscription {
        BusSubscription::new(self.tx.subscribe())
    }
}
