// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for the realtime socket surface.
//!
//! Client -> Server frames are JSON with an `event` discriminator (see
//! [`crate::events`]). Server -> Client frames are [`ServerEvent`] payloads
//! with a `type` discriminator.
//!
//! Identity comes from the `user_id` query parameter; authentication happens
//! upstream of this subsystem and the value is taken at face value.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use huddle_core::types::{ConnectionId, TranscriptLine, UserId};
use huddle_core::ServerEvent;
use huddle_relay::ConnectionHandle;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::{parse_client_event, ClientEvent, RoomEvent};
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: i64,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<GatewayState>,
) -> Response {
    let user_id = UserId(query.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Handle an individual WebSocket connection.
///
/// Registers presence, spawns a sender task draining the connection's event
/// queue, then reads inbound frames until close. Presence is unregistered
/// and the user marked offline on the way out.
async fn handle_socket(socket: WebSocket, state: GatewayState, user_id: UserId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let conn_id = ConnectionId(uuid::Uuid::new_v4().to_string());

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(64);
    state
        .presence
        .register(ConnectionHandle::new(conn_id.clone(), user_id, tx));
    if let Err(e) = state.store.set_user_online(user_id, true).await {
        warn!(error = %e, user_id = %user_id, "failed to mark user online");
    }
    debug!(user_id = %user_id, conn_id = %conn_id.0, "socket connected");

    // Forward queued server events to the WebSocket.
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "failed to encode server event");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let event = match parse_client_event(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, user_id = %user_id, "invalid socket frame dropped");
                        continue;
                    }
                };
                match event {
                    ClientEvent::Relay(relay_event) => state.relay.relay(relay_event).await,
                    ClientEvent::Room(room_event) => {
                        handle_room_event(&state, room_event).await;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {} // Binary and ping frames are ignored.
        }
    }

    // Cleanup: ephemeral presence, durable offline flag, room membership.
    // A stale socket closing after a reconnect owns none of this state any
    // more; only the connection still registered tears it down.
    if state.presence.unregister_if(user_id, &conn_id) {
        if let Err(e) = state.store.set_user_online(user_id, false).await {
            warn!(error = %e, user_id = %user_id, "failed to mark user offline");
        }
        for project in state.rooms.remove_from_all(user_id) {
            broadcast_presence_change(&state, &project, user_id, false);
        }
    } else {
        debug!(user_id = %user_id, conn_id = %conn_id.0,
               "stale socket closed after reconnect, presence kept");
    }
    sender_task.abort();
    debug!(user_id = %user_id, conn_id = %conn_id.0, "socket disconnected");
}

async fn handle_room_event(state: &GatewayState, event: RoomEvent) {
    match event {
        RoomEvent::ProjectRoomJoin {
            project_id,
            user_id,
        } => {
            match state.store.is_project_member(&project_id, user_id).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(user_id = %user_id, project_id = %project_id.0,
                          "room join refused, not a project member");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, project_id = %project_id.0,
                          "membership check failed, room join dropped");
                    return;
                }
            }
            state.rooms.join(&project_id, user_id);
            broadcast_presence_change(state, &project_id, user_id, true);
        }

        RoomEvent::ProjectRoomLeave {
            project_id,
            user_id,
        } => {
            state.rooms.leave(&project_id, user_id);
            broadcast_presence_change(state, &project_id, user_id, false);
        }

        RoomEvent::MeetingJoin {
            meeting_id,
            user_id,
        } => {
            if let Err(e) = state.meetings.join(&meeting_id).await {
                warn!(error = %e, meeting_id = %meeting_id.0, user_id = %user_id,
                      "meeting join failed");
            }
        }

        RoomEvent::MeetingLeave {
            meeting_id,
            user_id,
        } => {
            if let Err(e) = state.meetings.leave(&meeting_id).await {
                warn!(error = %e, meeting_id = %meeting_id.0, user_id = %user_id,
                      "meeting leave failed");
            }
        }

        RoomEvent::TranscriptSubmit {
            meeting_id,
            user_id,
            content,
        } => {
            state
                .transcripts
                .submit(TranscriptLine {
                    meeting_id,
                    user_id,
                    content,
                    created_at: chrono::Utc::now().to_rfc3339(),
                })
                .await;
        }
    }
}

/// Pushes a presence change to every room member connected on this process.
fn broadcast_presence_change(
    state: &GatewayState,
    project: &huddle_core::types::ProjectId,
    user_id: UserId,
    online: bool,
) {
    let event = ServerEvent::PresenceChange {
        project_id: project.clone(),
        user_id,
        online,
    };
    for member in state.rooms.members(project) {
        state.presence.push_to(member, event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use huddle_core::traits::MessageStore;
    use huddle_core::types::ProjectId;
    use huddle_relay::{MeetingTracker, MessageRelay, PresenceRegistry};
    use huddle_storage::TranscriptWriter;
    use huddle_test_utils::MemoryStore;

    use crate::rooms::RoomDirectory;

    fn test_state() -> (GatewayState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let presence = Arc::new(PresenceRegistry::new());
        let relay = Arc::new(MessageRelay::new(
            Arc::clone(&presence),
            store.clone() as Arc<dyn MessageStore>,
            None,
            Duration::from_secs(5),
            64,
        ));
        let state = GatewayState {
            relay,
            presence,
            store: store.clone(),
            meetings: Arc::new(MeetingTracker::new(store.clone(), store.clone())),
            transcripts: Arc::new(TranscriptWriter::new(store.clone(), 16)),
            rooms: Arc::new(RoomDirectory::new()),
            start_time: std::time::Instant::now(),
        };
        (state, store)
    }

    fn connect(state: &GatewayState, user: i64, conn: &str) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(8);
        state.presence.register(ConnectionHandle::new(
            ConnectionId(conn.to_owned()),
            UserId(user),
            tx,
        ));
        rx
    }

    #[tokio::test]
    async fn member_join_broadcasts_presence_change_to_room() {
        let (state, store) = test_state();
        let project = ProjectId("p1".to_owned());
        store.add_project_member(&project, UserId(1));
        store.add_project_member(&project, UserId(2));
        let mut first_rx = connect(&state, 1, "c1");
        connect(&state, 2, "c2");
        state.rooms.join(&project, UserId(1));

        handle_room_event(
            &state,
            RoomEvent::ProjectRoomJoin {
                project_id: project.clone(),
                user_id: UserId(2),
            },
        )
        .await;

        assert!(state.rooms.members(&project).contains(&UserId(2)));
        match first_rx.try_recv() {
            Ok(ServerEvent::PresenceChange {
                project_id,
                user_id,
                online,
            }) => {
                assert_eq!(project_id, project);
                assert_eq!(user_id, UserId(2));
                assert!(online);
            }
            other => panic!("expected presence change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_member_join_is_refused() {
        let (state, store) = test_state();
        let project = ProjectId("p1".to_owned());
        store.add_project_member(&project, UserId(1));
        let mut first_rx = connect(&state, 1, "c1");
        connect(&state, 2, "c2");
        state.rooms.join(&project, UserId(1));

        handle_room_event(
            &state,
            RoomEvent::ProjectRoomJoin {
                project_id: project.clone(),
                user_id: UserId(2),
            },
        )
        .await;

        assert!(!state.rooms.members(&project).contains(&UserId(2)));
        assert!(first_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn membership_check_failure_drops_join() {
        let (state, store) = test_state();
        let project = ProjectId("p1".to_owned());
        store.add_project_member(&project, UserId(1));
        store.add_project_member(&project, UserId(2));
        store.fail_membership_checks(true);
        let mut first_rx = connect(&state, 1, "c1");
        connect(&state, 2, "c2");
        state.rooms.join(&project, UserId(1));

        handle_room_event(
            &state,
            RoomEvent::ProjectRoomJoin {
                project_id: project.clone(),
                user_id: UserId(2),
            },
        )
        .await;

        assert!(!state.rooms.members(&project).contains(&UserId(2)));
        assert!(first_rx.try_recv().is_err());
    }
}
