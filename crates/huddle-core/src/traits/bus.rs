// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-instance pub/sub bus trait.
//!
//! One shared channel per deployment. A message published once is delivered
//! once per subscriber active at publish time; a subscriber attached after
//! publish never sees it (no replay).

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::HuddleError;
use crate::event::RelayEvent;

/// The shared relay channel enabling horizontal scale-out across processes.
#[async_trait]
pub trait RelayBus: Send + Sync {
    /// Publishes an enriched event onto the shared channel.
    async fn publish(&self, event: &RelayEvent) -> Result<(), HuddleError>;

    /// Opens a new subscription starting at the current position.
    fn subscribe(&self) -> BusSubscription;
}

/// A live subscription decoding relay events off the shared channel.
///
/// Undecodable payloads and lag are logged and skipped; at-least-once
/// delivery per active subscriber, no ordering guarantee across kinds.
pub struct BusSubscription {
    rx: broadcast::Receiver<String>,
}

impl BusSubscription {
    pub fn new(rx: broadcast::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Receives the next decodable event, or `None` once the channel closes.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        loop {
            match self.rx.recv().await {
                Ok(raw) => match serde_json::from_str::<RelayEvent>(&raw) {
                    Ok(event) => return Some(event),
                    Err(e) => {
                        warn!(error = %e, "dropping undecodable bus payload");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "bus subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    #[tokio::test]
    async fn subscription_skips_undecodable_payloads() {
        let (tx, rx) = broadcast::channel(8);
        let mut sub = BusSubscription::new(rx);

        tx.send("not json".to_string()).unwrap();
        let ev = RelayEvent::CallNoResponse {
            message_id: "m1".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
        };
        tx.send(serde_json::to_string(&ev).unwrap()).unwrap();

        let got = sub.recv().await.expect("event after bad payload");
        assert_eq!(got, ev);
    }

    #[tokio::test]
    async fn subscription_ends_when_channel_closes() {
        let (tx, rx) = broadcast::channel::<String>(8);
        let mut sub = BusSubscription::new(rx);
        drop(tx);
        assert!(sub.recv().await.is_none());
    }
}
