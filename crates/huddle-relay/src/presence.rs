// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-process presence registry.
//!
//! One entry per user, last-write-wins. A second connection for the same
//! user silently replaces the first without tearing it down; the stale
//! socket keeps draining its channel until it disconnects on its own.

use dashmap::DashMap;
use huddle_core::types::{ConnectionId, UserId};
use huddle_core::ServerEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Handle to one live connection's outbound event queue.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub conn_id: ConnectionId,
    pub user_id: UserId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(conn_id: ConnectionId, user_id: UserId, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            conn_id,
            user_id,
            tx,
        }
    }

    /// Queues an event for the socket writer. A full or closed queue drops
    /// the event with a warning; relay delivery is best-effort.
    pub fn push(&self, event: ServerEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(user_id = %self.user_id, conn_id = %self.conn_id.0, error = %e,
                  "dropping event for saturated or closed connection");
        }
    }
}

/// Injected registry instance owned by the server process. Not a global.
#[derive(Default)]
pub struct PresenceRegistry {
    entries: DashMap<UserId, ConnectionHandle>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, replacing any prior entry for the user.
    pub fn register(&self, handle: ConnectionHandle) {
        let user_id = handle.user_id;
        if self.entries.insert(user_id, handle).is_some() {
            debug!(user_id = %user_id, "presence entry replaced by newer connection");
        }
    }

    /// Removes the user's entry, if any.
    pub fn unregister(&self, user_id: UserId) {
        self.entries.remove(&user_id);
    }

    /// Removes the user's entry only if it still belongs to the given
    /// connection. A stale socket closing after a reconnect must not evict
    /// the newer connection's entry. Returns whether an entry was removed.
    pub fn unregister_if(&self, user_id: UserId, conn_id: &ConnectionId) -> bool {
        self.entries
            .remove_if(&user_id, |_, handle| handle.conn_id == *conn_id)
            .is_some()
    }

    /// The connection currently registered for the user on this process.
    /// Absent means "not connected here", not "offline".
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionHandle> {
        self.entries.get(&user_id).map(|e| e.clone())
    }

    /// Pushes an event to the user's connection if one is registered here.
    /// Returns whether a connection was found.
    pub fn push_to(&self, user_id: UserId, event: ServerEvent) -> bool {
        match self.lookup(user_id) {
            Some(handle) => {
                handle.push(event);
                true
            }
            None => false,
        }
    }

    /// Pushes an event to every registered connection.
    pub fn broadcast(&self, event: &ServerEvent) {
        for entry in self.entries.iter() {
            entry.value().push(event.clone());
        }
    }

    /// Users with a live connection on this process.
    pub fn registered_users(&self) -> Vec<UserId> {
        self.entries.iter().map(|e| *e.key()).collect()
    }

    pub fn connection_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(user: i64, conn: &str) -> (ConnectionHandle, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (
            ConnectionHandle::new(ConnectionId(conn.to_owned()), UserId(user), tx),
            rx,
        )
    }

    #[tokio::test]
    async fn lookup_returns_registered_connection_until_unregister() {
        let registry = PresenceRegistry::new();
        let (h, _rx) = handle(1, "c1");
        registry.register(h);

        assert_eq!(registry.lookup(UserId(1)).unwrap().conn_id.0, "c1");
        registry.unregister(UserId(1));
        assert!(registry.lookup(UserId(1)).is_none());
    }

    #[tokio::test]
    async fn second_register_overwrites_without_teardown() {
        let registry = PresenceRegistry::new();
        let (first, mut first_rx) = handle(1, "c1");
        let (second, mut second_rx) = handle(1, "c2");
        registry.register(first);
        registry.register(second);

        assert_eq!(registry.lookup(UserId(1)).unwrap().conn_id.0, "c2");
        assert!(registry.push_to(
            UserId(1),
            ServerEvent::CallNoResponse {
                message_id: "m".into()
            }
        ));
        assert!(second_rx.try_recv().is_ok());
        // The replaced connection got nothing but was never torn down.
        assert!(first_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_disconnect_does_not_evict_newer_connection() {
        let registry = PresenceRegistry::new();
        let (first, _first_rx) = handle(1, "c1");
        let (second, mut second_rx) = handle(1, "c2");
        registry.register(first);
        registry.register(second);

        // The replaced socket's cleanup runs after the reconnect.
        assert!(!registry.unregister_if(UserId(1), &ConnectionId("c1".to_owned())));
        assert_eq!(registry.lookup(UserId(1)).unwrap().conn_id.0, "c2");
        assert!(registry.push_to(
            UserId(1),
            ServerEvent::CallNoResponse {
                message_id: "m".into()
            }
        ));
        assert!(second_rx.try_recv().is_ok());

        // The current connection's own cleanup still removes the entry.
        assert!(registry.unregister_if(UserId(1), &ConnectionId("c2".to_owned())));
        assert!(registry.lookup(UserId(1)).is_none());
    }

    #[tokio::test]
    async fn push_to_unknown_user_reports_absent() {
        let registry = PresenceRegistry::new();
        assert!(!registry.push_to(
            UserId(9),
            ServerEvent::CallNoResponse {
                message_id: "m".into()
            }
        ));
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let registry = PresenceRegistry::new();
        let (a, mut a_rx) = handle(1, "c1");
        let (b, mut b_rx) = handle(2, "c2");
        registry.register(a);
        registry.register(b);

        registry.broadcast(&ServerEvent::CallNoResponse {
            message_id: "m".into(),
        });
        assert!(a_rx.try_recv().is_ok());
        assert!(b_rx.try_recv().is_ok());
    }
}
