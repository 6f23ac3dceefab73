// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The relay event taxonomy and the server-to-client push events.
//!
//! `RelayEvent` is the single sum type routed through the relay's dispatch
//! point and across the cross-instance bus. Payloads carry every field needed
//! to re-dispatch on a remote process without re-querying storage.

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, ProjectId, UserId};

/// An event accepted by the message relay.
///
/// Serialized with an `event` discriminator matching the socket taxonomy, so
/// the same encoding is used on the wire and on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RelayEvent {
    /// Conversation message: direct when `receiver_id` is set and
    /// `is_group_chat` is false, group/project broadcast otherwise.
    MessageSend {
        conversation_id: String,
        sender_id: UserId,
        #[serde(default)]
        receiver_id: Option<UserId>,
        content: String,
        #[serde(default = "default_content_type")]
        content_type: String,
        #[serde(default)]
        project_id: Option<ProjectId>,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        is_group_chat: bool,
        /// Persisted message identifier, attached by the relay before publish.
        #[serde(default)]
        message_id: Option<String>,
    },

    /// One-to-one message, deduplicated on (conversation, sender, content).
    PrivateMessageSend {
        private_conversation_id: String,
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
        #[serde(default = "default_content_type")]
        content_type: String,
        #[serde(default)]
        message_id: Option<String>,
    },

    /// Start ringing the callee. Persists a call message row in RINGING state.
    CallInvite {
        conversation_id: String,
        caller_id: UserId,
        callee_id: UserId,
        #[serde(default)]
        message_id: Option<String>,
    },

    /// Callee answered (or declined) a ringing call.
    CallAnswer {
        message_id: String,
        caller_id: UserId,
        callee_id: UserId,
        #[serde(default = "default_true")]
        accepted: bool,
    },

    /// Opaque signaling payload relayed between call peers (SDP/ICE etc.).
    /// Latency-sensitive: not persisted, skips notification fanout.
    CallSignal {
        sender_id: UserId,
        receiver_id: UserId,
        payload: serde_json::Value,
    },

    /// Either peer hung up. Duration is client-reported.
    CallEnd {
        message_id: String,
        caller_id: UserId,
        callee_id: UserId,
        #[serde(default)]
        duration_secs: Option<i64>,
    },

    /// Caller-reported ring timeout. There is no server-side timer; the
    /// client is trusted to emit this.
    CallNoResponse {
        message_id: String,
        caller_id: UserId,
        callee_id: UserId,
    },
}

fn default_content_type() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl RelayEvent {
    /// The wire discriminator for this event.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayEvent::MessageSend { .. } => "message-send",
            RelayEvent::PrivateMessageSend { .. } => "private-message-send",
            RelayEvent::CallInvite { .. } => "call-invite",
            RelayEvent::CallAnswer { .. } => "call-answer",
            RelayEvent::CallSignal { .. } => "call-signal",
            RelayEvent::CallEnd { .. } => "call-end",
            RelayEvent::CallNoResponse { .. } => "call-no-response",
        }
    }

    /// Checks the minimally required fields for this event kind.
    ///
    /// A failing event is dropped and logged by the relay; no error reaches
    /// the sender.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            RelayEvent::MessageSend {
                conversation_id,
                content,
                ..
            } => {
                if conversation_id.trim().is_empty() {
                    return Err("missing conversation_id");
                }
                if content.is_empty() {
                    return Err("empty content");
                }
                Ok(())
            }
            RelayEvent::PrivateMessageSend {
                private_conversation_id,
                content,
                ..
            } => {
                if private_conversation_id.trim().is_empty() {
                    return Err("missing private_conversation_id");
                }
                if content.is_empty() {
                    return Err("empty content");
                }
                Ok(())
            }
            RelayEvent::CallInvite {
                conversation_id, ..
            } => {
                if conversation_id.trim().is_empty() {
                    return Err("missing conversation_id");
                }
                Ok(())
            }
            RelayEvent::CallAnswer { message_id, .. }
            | RelayEvent::CallEnd { message_id, .. }
            | RelayEvent::CallNoResponse { message_id, .. } => {
                if message_id.trim().is_empty() {
                    return Err("missing message_id");
                }
                Ok(())
            }
            RelayEvent::CallSignal { payload, .. } => {
                if payload.is_null() {
                    return Err("missing signal payload");
                }
                Ok(())
            }
        }
    }

    /// Pure call-signal relays skip notification fanout.
    pub fn skips_notification(&self) -> bool {
        matches!(self, RelayEvent::CallSignal { .. })
    }

    /// The user who originated this event.
    pub fn sender(&self) -> UserId {
        match self {
            RelayEvent::MessageSend { sender_id, .. }
            | RelayEvent::PrivateMessageSend { sender_id, .. }
            | RelayEvent::CallSignal { sender_id, .. } => *sender_id,
            RelayEvent::CallInvite { caller_id, .. }
            | RelayEvent::CallEnd { caller_id, .. }
            | RelayEvent::CallNoResponse { caller_id, .. } => *caller_id,
            RelayEvent::CallAnswer { callee_id, .. } => *callee_id,
        }
    }
}

/// Relative urgency attached to a notification payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

/// Secondary "you have a notification" payload emitted after delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
}

/// An event pushed to one live connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A delivered chat message (direct receipt or group broadcast).
    Message { message: ChatMessage },

    /// Echo to the sender's own connection for UI confirmation.
    MessageAck {
        message_id: String,
        conversation_id: String,
    },

    CallInvite {
        message_id: String,
        conversation_id: String,
        caller_id: UserId,
    },

    CallAnswer {
        message_id: String,
        accepted: bool,
    },

    CallSignal {
        sender_id: UserId,
        payload: serde_json::Value,
    },

    CallEnd {
        message_id: String,
        duration_secs: Option<i64>,
    },

    CallNoResponse { message_id: String },

    Notification(Notification),

    /// Project-room presence change broadcast to room members.
    PresenceChange {
        project_id: ProjectId,
        user_id: UserId,
        online: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_event_wire_discriminators() {
        let ev = RelayEvent::PrivateMessageSend {
            private_conversation_id: "c1".into(),
            sender_id: UserId(1),
            receiver_id: UserId(2),
            content: "hi".into(),
            content_type: "text".into(),
            message_id: None,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "private-message-send");
        assert_eq!(ev.kind(), "private-message-send");
    }

    #[test]
    fn message_send_defaults_apply() {
        let json = r#"{
            "event": "message-send",
            "conversation_id": "c9",
            "sender_id": 4,
            "content": "hello team"
        }"#;
        let ev: RelayEvent = serde_json::from_str(json).unwrap();
        match ev {
            RelayEvent::MessageSend {
                content_type,
                is_group_chat,
                receiver_id,
                message_id,
                ..
            } => {
                assert_eq!(content_type, "text");
                assert!(!is_group_chat);
                assert!(receiver_id.is_none());
                assert!(message_id.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn bus_round_trip_preserves_enriched_id() {
        let ev = RelayEvent::MessageSend {
            conversation_id: "c1".into(),
            sender_id: UserId(7),
            receiver_id: Some(UserId(8)),
            content: "x".into(),
            content_type: "text".into(),
            project_id: None,
            task_id: None,
            is_group_chat: false,
            message_id: Some("m-123".into()),
        };
        let raw = serde_json::to_string(&ev).unwrap();
        let back: RelayEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let ev = RelayEvent::MessageSend {
            conversation_id: "c1".into(),
            sender_id: UserId(1),
            receiver_id: None,
            content: String::new(),
            content_type: "text".into(),
            project_id: None,
            task_id: None,
            is_group_chat: false,
            message_id: None,
        };
        assert_eq!(ev.validate(), Err("empty content"));

        let ev = RelayEvent::CallEnd {
            message_id: "  ".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
            duration_secs: Some(10),
        };
        assert_eq!(ev.validate(), Err("missing message_id"));
    }

    #[test]
    fn only_call_signal_skips_notification() {
        let signal = RelayEvent::CallSignal {
            sender_id: UserId(1),
            receiver_id: UserId(2),
            payload: serde_json::json!({"sdp": "offer"}),
        };
        assert!(signal.skips_notification());

        let invite = RelayEvent::CallInvite {
            conversation_id: "c1".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
            message_id: None,
        };
        assert!(!invite.skips_notification());
    }

    #[test]
    fn server_event_tagged_by_type() {
        let ev = ServerEvent::Notification(Notification {
            title: "New message".into(),
            body: "hi".into(),
            priority: NotificationPriority::Normal,
        });
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["priority"], "normal");
    }
}
