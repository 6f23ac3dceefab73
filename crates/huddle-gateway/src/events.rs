// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound socket event parsing.
//!
//! Relay kinds decode straight into [`RelayEvent`]; the room and meeting
//! kinds are gateway-local and never cross the bus.

use huddle_core::types::{MeetingId, ProjectId, UserId};
use huddle_core::RelayEvent;
use serde::Deserialize;

/// Gateway-local events handled without entering the relay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RoomEvent {
    /// Membership-gated join of a project presence room.
    ProjectRoomJoin {
        project_id: ProjectId,
        user_id: UserId,
    },
    ProjectRoomLeave {
        project_id: ProjectId,
        user_id: UserId,
    },
    MeetingJoin {
        meeting_id: MeetingId,
        user_id: UserId,
    },
    MeetingLeave {
        meeting_id: MeetingId,
        user_id: UserId,
    },
    TranscriptSubmit {
        meeting_id: MeetingId,
        user_id: UserId,
        content: String,
    },
}

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Room(RoomEvent),
    Relay(RelayEvent),
}

/// Decodes a text frame against the full socket taxonomy.
pub fn parse_client_event(raw: &str) -> Result<ClientEvent, serde_json::Error> {
    match serde_json::from_str::<RoomEvent>(raw) {
        Ok(room) => Ok(ClientEvent::Room(room)),
        Err(_) => serde_json::from_str::<RelayEvent>(raw).map(ClientEvent::Relay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_kinds_parse_as_relay_events() {
        let raw = r#"{"event":"private-message-send","private_conversation_id":"c1",
                      "sender_id":1,"receiver_id":2,"content":"hi"}"#;
        match parse_client_event(raw).unwrap() {
            ClientEvent::Relay(RelayEvent::PrivateMessageSend { content, .. }) => {
                assert_eq!(content, "hi");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn room_kinds_parse_as_room_events() {
        let raw = r#"{"event":"project-room-join","project_id":"p1","user_id":3}"#;
        match parse_client_event(raw).unwrap() {
            ClientEvent::Room(RoomEvent::ProjectRoomJoin {
                project_id,
                user_id,
            }) => {
                assert_eq!(project_id.0, "p1");
                assert_eq!(user_id, UserId(3));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn transcript_submit_parses() {
        let raw = r#"{"event":"transcript-submit","meeting_id":"m1","user_id":5,
                      "content":"so the deadline is friday"}"#;
        match parse_client_event(raw).unwrap() {
            ClientEvent::Room(RoomEvent::TranscriptSubmit { meeting_id, .. }) => {
                assert_eq!(meeting_id.0, "m1");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_kind_is_an_error() {
        assert!(parse_client_event(r#"{"event":"make-coffee"}"#).is_err());
        assert!(parse_client_event("not json").is_err());
    }
}
