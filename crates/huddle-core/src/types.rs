// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common model types shared across the Huddle workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a platform user.
///
/// Supplied by the client at connect time; this subsystem does not verify it
/// (authentication is an external collaborator).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one live transport-layer session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub String);

/// Unique identifier for a project room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Unique identifier for a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingId(pub String);

/// Lifecycle status of a voice call, stored on the originating chat message row.
///
/// `Ended`, `Rejected`, and `NoResponse` are absorbing: once recorded, no
/// further transition is accepted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Ringing,
    Processing,
    Rejected,
    Ended,
    NoResponse,
}

impl CallStatus {
    /// Whether this status is terminal (no further transitions accepted).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallStatus::Ended | CallStatus::Rejected | CallStatus::NoResponse
        )
    }
}

/// Lifecycle status of a meeting, driven by the participant counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Processing,
    Completed,
}

/// A persisted chat message row.
///
/// Created by the relay before fanout. Never mutated afterwards except for
/// call messages, whose `call_status`/`call_duration_secs` fields are updated
/// as the call progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: UserId,
    /// `None` for group/project/public messages.
    pub receiver_id: Option<UserId>,
    pub content: String,
    /// Content kind, e.g. "text", "file", "call".
    pub content_type: String,
    pub project_id: Option<ProjectId>,
    pub task_id: Option<String>,
    pub is_group_chat: bool,
    pub call_status: Option<CallStatus>,
    pub call_duration_secs: Option<i64>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// One line of a meeting transcript, appended to the durable transcript log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub meeting_id: MeetingId,
    pub user_id: UserId,
    pub content: String,
    /// RFC 3339 submission timestamp.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn call_status_terminal_states() {
        assert!(!CallStatus::Ringing.is_terminal());
        assert!(!CallStatus::Processing.is_terminal());
        assert!(CallStatus::Rejected.is_terminal());
        assert!(CallStatus::Ended.is_terminal());
        assert!(CallStatus::NoResponse.is_terminal());
    }

    #[test]
    fn call_status_string_round_trip() {
        for status in [
            CallStatus::Ringing,
            CallStatus::Processing,
            CallStatus::Rejected,
            CallStatus::Ended,
            CallStatus::NoResponse,
        ] {
            let s = status.to_string();
            let parsed = CallStatus::from_str(&s).expect("should parse back");
            assert_eq!(status, parsed);
        }
        assert_eq!(CallStatus::NoResponse.to_string(), "NO_RESPONSE");
    }

    #[test]
    fn meeting_status_display() {
        assert_eq!(MeetingStatus::Processing.to_string(), "PROCESSING");
        assert_eq!(MeetingStatus::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn user_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
        let back: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(back, UserId(42));
    }
}
